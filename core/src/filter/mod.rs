//! Filter evaluation
//!
//! A filter is a flat list of `{field, comparator, value}` rules joined by a
//! single connective. Rules are interpreted here against the scalar fields of
//! an event; nothing is ever compiled or executed as script.

mod error;
mod fields;

pub use alertcast_types::{Comparator, Filter, FilterConnective, FilterField, FilterRule};
pub use error::FilterError;
pub use fields::{EventFields, FieldValue, parse_tier};

use alertcast_types::AlertEvent;

use fields::parse_numeric;

/// Evaluate a filter against extracted event fields.
///
/// An empty rule list always passes.
pub fn evaluate(filter: &Filter, fields: &EventFields<'_>) -> bool {
    if filter.items.is_empty() {
        return true;
    }

    match filter.operator {
        FilterConnective::And => filter.items.iter().all(|r| evaluate_rule(r, fields)),
        FilterConnective::Or => filter.items.iter().any(|r| evaluate_rule(r, fields)),
    }
}

/// Evaluate one rule. Missing fields and type mismatches evaluate to false.
pub fn evaluate_rule(rule: &FilterRule, fields: &EventFields<'_>) -> bool {
    let Some(actual) = fields.get(rule.field) else {
        return false;
    };

    match actual {
        FieldValue::Number(n) => compare_number(rule, n),
        FieldValue::Text(s) => compare_text(rule, s),
    }
}

fn compare_number(rule: &FilterRule, actual: f64) -> bool {
    match rule.comparator {
        Comparator::Present => true,
        Comparator::IsEven => is_integer(actual) && (actual as i64) % 2 == 0,
        Comparator::IsOdd => is_integer(actual) && (actual as i64) % 2 != 0,
        Comparator::Includes => rule
            .value
            .split(',')
            .filter_map(|v| parse_numeric(rule.field, v))
            .any(|v| v == actual),
        Comparator::Contains => false,
        cmp => {
            let Some(expected) = parse_numeric(rule.field, &rule.value) else {
                return false;
            };
            match cmp {
                Comparator::Eq => actual == expected,
                Comparator::Neq => actual != expected,
                Comparator::Lt => actual < expected,
                Comparator::LtEq => actual <= expected,
                Comparator::Gt => actual > expected,
                Comparator::GtEq => actual >= expected,
                _ => false,
            }
        }
    }
}

fn compare_text(rule: &FilterRule, actual: &str) -> bool {
    let expected = rule.value.trim();
    match rule.comparator {
        Comparator::Eq => actual.eq_ignore_ascii_case(expected),
        Comparator::Neq => !actual.eq_ignore_ascii_case(expected),
        Comparator::Contains => actual
            .to_lowercase()
            .contains(&expected.to_lowercase()),
        Comparator::Includes => expected
            .split(',')
            .any(|v| v.trim().eq_ignore_ascii_case(actual)),
        Comparator::Present => !actual.trim().is_empty(),
        // Ordering and parity are undefined on text
        _ => false,
    }
}

fn is_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0
}

/// Statically check a filter for rules that can never match as written
pub fn validate(filter: &Filter) -> Vec<FilterError> {
    filter.items.iter().filter_map(validate_rule).collect()
}

fn validate_rule(rule: &FilterRule) -> Option<FilterError> {
    let numeric = rule.field.is_numeric();

    if !numeric && rule.comparator.is_numeric_only() {
        return Some(FilterError::NumericOnText {
            field: rule.field,
            comparator: rule.comparator,
        });
    }
    if numeric && rule.comparator == Comparator::Contains {
        return Some(FilterError::TextOnNumeric {
            field: rule.field,
            comparator: rule.comparator,
        });
    }
    if !rule.comparator.needs_value() {
        return None;
    }
    if rule.value.trim().is_empty() && rule.comparator != Comparator::Neq {
        return Some(FilterError::MissingValue { field: rule.field });
    }
    if numeric
        && rule.comparator != Comparator::Includes
        && parse_numeric(rule.field, &rule.value).is_none()
    {
        return Some(FilterError::NotANumber {
            field: rule.field,
            value: rule.value.clone(),
        });
    }
    None
}

/// Convenience matching directly against an event
pub trait FilterMatching {
    fn matches_event(&self, event: &AlertEvent) -> bool;
}

impl FilterMatching for Filter {
    fn matches_event(&self, event: &AlertEvent) -> bool {
        evaluate(self, &EventFields::from_event(event))
    }
}

#[cfg(test)]
mod tests {
    use alertcast_types::EventKind;

    use super::*;

    fn tip(amount: f64) -> AlertEvent {
        let mut event = AlertEvent::new("t1", EventKind::Tip, "Viewer");
        event.amount = Some(amount);
        event
    }

    fn rule(field: FilterField, comparator: Comparator, value: &str) -> FilterRule {
        FilterRule::new(field, comparator, value)
    }

    #[test]
    fn empty_filter_always_passes() {
        assert!(Filter::default().matches_event(&tip(1.0)));
    }

    #[test]
    fn prime_tier_compares_as_zero() {
        let mut event = tip(150.0);
        event.tier = Some("Prime".to_string());

        let filter = Filter::all(vec![
            rule(FilterField::Amount, Comparator::Gt, "100"),
            rule(FilterField::Tier, Comparator::Eq, "0"),
        ]);
        assert!(filter.matches_event(&event));

        let filter = Filter::all(vec![rule(FilterField::Amount, Comparator::Gt, "200")]);
        assert!(!filter.matches_event(&event));
    }

    #[test]
    fn or_connective_needs_one_rule() {
        let filter = Filter::any(vec![
            rule(FilterField::Amount, Comparator::Gt, "1000"),
            rule(FilterField::Username, Comparator::Eq, "viewer"),
        ]);
        assert!(filter.matches_event(&tip(5.0)));

        let filter = Filter::any(vec![
            rule(FilterField::Amount, Comparator::Gt, "1000"),
            rule(FilterField::Username, Comparator::Eq, "someone"),
        ]);
        assert!(!filter.matches_event(&tip(5.0)));
    }

    #[test]
    fn missing_field_fails_its_rule() {
        // follow events carry no amount
        let event = AlertEvent::new("f1", EventKind::Follow, "viewer");
        let filter = Filter::all(vec![rule(FilterField::Amount, Comparator::Neq, "5")]);
        assert!(!filter.matches_event(&event));

        let filter = Filter::all(vec![rule(FilterField::Message, Comparator::Present, "")]);
        assert!(!filter.matches_event(&event));
    }

    #[test]
    fn text_comparators() {
        let mut event = tip(10.0);
        event.message = Some("Hello from the Stream".to_string());
        event.game = Some("Just Chatting".to_string());

        let contains = Filter::all(vec![rule(FilterField::Message, Comparator::Contains, "stream")]);
        assert!(contains.matches_event(&event));

        let includes = Filter::all(vec![rule(
            FilterField::Game,
            Comparator::Includes,
            "Minecraft, just chatting",
        )]);
        assert!(includes.matches_event(&event));

        let ordered = Filter::all(vec![rule(FilterField::Message, Comparator::Gt, "a")]);
        assert!(!ordered.matches_event(&event));
    }

    #[test]
    fn parity_comparators() {
        let even = Filter::all(vec![rule(FilterField::Amount, Comparator::IsEven, "")]);
        let odd = Filter::all(vec![rule(FilterField::Amount, Comparator::IsOdd, "")]);

        assert!(even.matches_event(&tip(42.0)));
        assert!(!odd.matches_event(&tip(42.0)));
        assert!(odd.matches_event(&tip(7.0)));
        assert!(!even.matches_event(&tip(7.5)));
        assert!(!odd.matches_event(&tip(7.5)));
    }

    #[test]
    fn unparseable_literal_fails_rule() {
        let filter = Filter::all(vec![rule(FilterField::Amount, Comparator::Gt, "lots")]);
        assert!(!filter.matches_event(&tip(500.0)));
    }

    #[test]
    fn validation_flags_type_mismatches() {
        let filter = Filter::all(vec![
            rule(FilterField::Username, Comparator::Gt, "5"),
            rule(FilterField::Amount, Comparator::Contains, "5"),
            rule(FilterField::Amount, Comparator::Eq, "five"),
            rule(FilterField::Game, Comparator::Eq, ""),
            rule(FilterField::Tier, Comparator::Eq, "Prime"),
            rule(FilterField::Message, Comparator::Present, ""),
        ]);

        let errors = validate(&filter);
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], FilterError::NumericOnText { .. }));
        assert!(matches!(errors[1], FilterError::TextOnNumeric { .. }));
        assert!(matches!(errors[2], FilterError::NotANumber { .. }));
        assert!(matches!(errors[3], FilterError::MissingValue { .. }));
    }
}
