//! Error types for pattern compilation and path building.

use thiserror::Error;

/// Errors raised while compiling a path pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A parameter's custom pattern (or the assembled matcher) is not a valid regex.
    #[error("invalid pattern `{path}`: {source}")]
    InvalidRegex {
        path: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while substituting bindings back into a pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A required token has no bound value.
    #[error("expected \"{name}\" to be defined")]
    Missing { name: String },

    /// A list was bound to a token that does not repeat.
    #[error("expected \"{name}\" to not repeat, but received a list")]
    NotRepeatable { name: String },

    /// An empty list was bound to a required repeated token.
    #[error("expected \"{name}\" to not be empty")]
    Empty { name: String },

    /// The encoded value does not satisfy the token's pattern.
    #[error("expected \"{name}\" to match \"{pattern}\", but received \"{segment}\"")]
    Mismatch {
        name: String,
        pattern: String,
        segment: String,
    },
}

/// Result type alias for pattern compilation.
pub type Result<T> = std::result::Result<T, PatternError>;
