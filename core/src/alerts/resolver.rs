//! Alert resolution: event → weighted choice among matching variants

use std::sync::Arc;

use alertcast_types::{AlertDefinition, AlertEvent, EventKind};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::filter::{EventFields, evaluate};

use super::SelectedVariant;

/// Why an event produced no alert. Not an error: the event is simply dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No definition hooks this event kind (or reward id)
    NoHook,
    /// Every candidate was disabled or rejected by its filter
    FilteredOut,
    /// Remaining candidates all have zero weight
    ZeroWeight,
    /// Custom trigger without an alert id
    MissingAlertId,
    /// Custom trigger naming an alert that does not exist (or is disabled)
    UnknownAlert(String),
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::NoHook => f.write_str("no alert hooks this event"),
            Unresolved::FilteredOut => f.write_str("no alert left after filters"),
            Unresolved::ZeroWeight => f.write_str("all matching alerts have zero weight"),
            Unresolved::MissingAlertId => f.write_str("custom trigger without alert id"),
            Unresolved::UnknownAlert(id) => write!(f, "custom trigger for unknown alert '{}'", id),
        }
    }
}

/// Picks which configured alert plays for an event.
///
/// Pure selection: callers own presentation state.
#[derive(Debug, Clone, Default)]
pub struct AlertResolver {
    definitions: Vec<Arc<AlertDefinition>>,
}

impl AlertResolver {
    pub fn new(definitions: Vec<AlertDefinition>) -> Self {
        Self {
            definitions: definitions.into_iter().map(Arc::new).collect(),
        }
    }

    /// Swap in a freshly loaded definition set
    pub fn replace_definitions(&mut self, definitions: Vec<AlertDefinition>) {
        self.definitions = definitions.into_iter().map(Arc::new).collect();
    }

    pub fn definitions(&self) -> impl Iterator<Item = &AlertDefinition> {
        self.definitions.iter().map(|d| d.as_ref())
    }

    /// Definitions hooked to the event's kind (and reward, for redeems)
    fn hooked<'a>(&'a self, event: &'a AlertEvent) -> impl Iterator<Item = &'a Arc<AlertDefinition>> {
        self.definitions.iter().filter(move |def| {
            def.hooks.contains(&event.kind)
                && (event.kind != EventKind::Rewardredeem || def.reward_id == event.reward_id)
        })
    }

    /// Enabled, filter-passing candidates: every hooked definition's main
    /// variant followed by its variants.
    pub fn candidates(&self, event: &AlertEvent) -> Vec<SelectedVariant> {
        let fields = EventFields::from_event(event);
        self.hooked(event)
            .flat_map(|def| {
                std::iter::once(SelectedVariant::main(Arc::clone(def))).chain(
                    (0..def.variants.len())
                        .map(move |i| SelectedVariant::variant_at(Arc::clone(def), i)),
                )
            })
            .filter(|c| c.enabled() && evaluate(c.filter(), &fields))
            .collect()
    }

    /// Whether any alert could play for this event
    pub fn has_candidates(&self, event: &AlertEvent) -> bool {
        match event.kind {
            EventKind::Custom => self.resolve_custom(event).is_ok(),
            _ => !self.candidates(event).is_empty(),
        }
    }

    /// Choose an alert for `event`, or `None` if it should be dropped
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        event: &AlertEvent,
        rng: &mut R,
    ) -> Option<SelectedVariant> {
        self.try_resolve(event, rng).ok()
    }

    /// Like [`resolve`](Self::resolve) but reports why nothing was chosen
    pub fn try_resolve<R: Rng + ?Sized>(
        &self,
        event: &AlertEvent,
        rng: &mut R,
    ) -> Result<SelectedVariant, Unresolved> {
        if event.kind == EventKind::Custom {
            return self.resolve_custom(event);
        }

        if self.hooked(event).next().is_none() {
            return Err(Unresolved::NoHook);
        }

        let candidates = self.candidates(event);
        if candidates.is_empty() {
            return Err(Unresolved::FilteredOut);
        }

        // Selection probability is proportional to weight; zero never wins
        candidates
            .choose_weighted(rng, |c| c.weight())
            .cloned()
            .map_err(|_| Unresolved::ZeroWeight)
    }

    /// Custom triggers name their alert exactly, bypassing weights and filters
    fn resolve_custom(&self, event: &AlertEvent) -> Result<SelectedVariant, Unresolved> {
        let Some(alert_id) = event.alert_id.as_deref() else {
            return Err(Unresolved::MissingAlertId);
        };

        for def in self.hooked(event) {
            if def.id == alert_id && def.enabled {
                return Ok(SelectedVariant::main(Arc::clone(def)));
            }
            if let Some(index) = def
                .variants
                .iter()
                .position(|v| v.id == alert_id && v.enabled)
            {
                return Ok(SelectedVariant::variant_at(Arc::clone(def), index));
            }
        }

        Err(Unresolved::UnknownAlert(alert_id.to_string()))
    }
}
