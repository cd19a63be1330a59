use thiserror::Error;

/// Failures raised while parsing directive strings, registering
/// implementations, or constructing match predicates. These never escape a
/// comparison call: the comparer converts each one into a structured
/// `directive-error` record at the path where it occurred.
#[derive(Debug, Error)]
pub enum DirectiveError {
    // Directive string does not satisfy the grammar
    #[error("parse error: {0}")]
    Parse(String),

    // Registry lookup miss; lists what is registered to aid debugging
    #[error("unknown {category} '{name}' (registered: {known})")]
    Unknown {
        category: &'static str,
        name: String,
        known: String,
    },

    // Fail-fast re-registration of an existing name
    #[error("{category} '{name}' is already registered")]
    Duplicate {
        category: &'static str,
        name: String,
    },

    // Arguments were tokenized fine but do not satisfy the directive
    #[error("invalid arguments for '{action}': {reason}")]
    Args { action: String, reason: String },
}

pub type Result<T> = std::result::Result<T, DirectiveError>;
