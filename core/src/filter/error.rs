//! Static validation errors for filter rules

use alertcast_types::{Comparator, FilterField};
use thiserror::Error;

/// A rule that can never evaluate the way its author intended
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("comparator '{}' needs a numeric field, '{}' is text", .comparator.label(), .field.as_str())]
    NumericOnText {
        field: FilterField,
        comparator: Comparator,
    },

    #[error("comparator '{}' needs a text field, '{}' is numeric", .comparator.label(), .field.as_str())]
    TextOnNumeric {
        field: FilterField,
        comparator: Comparator,
    },

    #[error("rule on '{}' has no value to compare against", .field.as_str())]
    MissingValue { field: FilterField },

    #[error("rule on '{}' compares against non-numeric value '{value}'", .field.as_str())]
    NotANumber { field: FilterField, value: String },
}
