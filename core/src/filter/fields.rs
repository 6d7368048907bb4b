//! Scalar fields extracted from an event for filter evaluation

use alertcast_types::{AlertEvent, FilterField};

/// A field value as seen by the evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

/// Borrowed view of the filterable fields of one event
#[derive(Debug, Clone, Copy)]
pub struct EventFields<'a> {
    pub username: &'a str,
    pub amount: Option<f64>,
    pub tier: Option<f64>,
    pub game: &'a str,
    pub message: Option<&'a str>,
    pub service: Option<&'a str>,
    pub recipient: Option<&'a str>,
}

impl<'a> EventFields<'a> {
    pub fn from_event(event: &'a AlertEvent) -> Self {
        Self {
            username: &event.username,
            amount: event.amount,
            tier: event.tier.as_deref().and_then(parse_tier),
            game: event.game.as_deref().unwrap_or(""),
            message: event.message.as_deref(),
            service: event.service.as_deref(),
            recipient: event.recipient.as_deref(),
        }
    }

    /// Look up a field. `None` means the event does not carry it.
    pub fn get(&self, field: FilterField) -> Option<FieldValue<'a>> {
        match field {
            FilterField::Username => Some(FieldValue::Text(self.username)),
            FilterField::Amount => self.amount.map(FieldValue::Number),
            FilterField::Tier => self.tier.map(FieldValue::Number),
            FilterField::Game => Some(FieldValue::Text(self.game)),
            FilterField::Message => self.message.map(FieldValue::Text),
            FilterField::Service => self.service.map(FieldValue::Text),
            FilterField::Recipient => self.recipient.map(FieldValue::Text),
        }
    }
}

/// Tier as a number; "Prime" counts as tier 0
pub fn parse_tier(tier: &str) -> Option<f64> {
    let tier = tier.trim();
    if tier.eq_ignore_ascii_case("prime") {
        Some(0.0)
    } else {
        tier.parse().ok()
    }
}

/// Parse a rule literal for a numeric field
pub(crate) fn parse_numeric(field: FilterField, value: &str) -> Option<f64> {
    match field {
        FilterField::Tier => parse_tier(value),
        _ => value.trim().parse().ok(),
    }
}
