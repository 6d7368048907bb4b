//! Bounded memory of recently processed event ids

use std::collections::VecDeque;

use hashbrown::HashSet;

/// How many ids are remembered before the oldest is forgotten
pub const DEFAULT_DEDUP_CAPACITY: usize = 20;

/// Outcome of offering an event id to the deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accept,
    Duplicate,
}

/// FIFO of the last N processed event ids.
///
/// Purely advisory memory: never persisted, owned by one overlay instance.
#[derive(Debug, Clone)]
pub struct EventDeduplicator {
    capacity: usize,
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}

impl EventDeduplicator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity + 1),
            ids: HashSet::with_capacity(capacity + 1),
        }
    }

    /// Check whether an id is currently remembered
    pub fn seen(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Remember `id`, evicting the oldest entry when over capacity
    pub fn process(&mut self, id: &str) -> Admission {
        if self.ids.contains(id) {
            return Admission::Duplicate;
        }

        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());

        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.ids.remove(&evicted);
            }
        }

        Admission::Accept
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
