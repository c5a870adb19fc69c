//! Error types for name parsing and unit rendering.

use thiserror::Error;

/// A workload name did not match `app[_vN][.type].num`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("invalid workload name format: {0:?}")]
    InvalidFormat(String),
}

/// Errors raised while substituting placeholders into a unit template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("template placeholder {{{key}}} has no value (directive {section}.{name})")]
    MissingParameter {
        key: String,
        section: String,
        name: String,
    },

    #[error("malformed template value in directive {section}.{name}: {reason}")]
    Malformed {
        section: String,
        name: String,
        reason: String,
    },
}
