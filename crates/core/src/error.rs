use serde::{Deserialize, Serialize};

/// A parameter validation failure.
///
/// Always attributable to a single property name so the caller can reject
/// the request with a pointer at the offending input. Validation errors are
/// never retried; they mean the request itself is wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("invalid parameter {field}: {message}")]
pub struct ValidationError {
    /// The property (dotted/indexed for nested input, e.g. `firewallRules[0].name`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the "required property is missing" case.
    pub fn missing(field: impl Into<String>) -> Self {
        ValidationError::new(field, "required property is missing")
    }
}
