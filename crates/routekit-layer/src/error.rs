//! Error types for route layers.

use routekit_pattern::{BuildError, PatternError};
use thiserror::Error;

/// Layer-specific errors.
#[derive(Debug, Error)]
pub enum LayerError {
    /// A declared middleware entry is not a handler.
    #[error("{methods} `{route}`: `middleware` must be a function, not `{found}`")]
    NotCallable {
        methods: String,
        route: String,
        found: &'static str,
    },

    /// A declared middleware entry names no registered handler.
    #[error("{methods} `{route}`: no handler registered as `{handler}`")]
    UnknownHandler {
        methods: String,
        route: String,
        handler: String,
    },

    /// The path pattern could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A URL could not be generated from the supplied bindings.
    #[error("cannot build url: {0}")]
    Build(#[from] BuildError),

    /// The query component could not be encoded.
    #[error("cannot encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// A middleware rejected the request.
    #[error("middleware rejected request: {0}")]
    Middleware(String),
}

/// Result type alias for layer operations.
pub type Result<T> = std::result::Result<T, LayerError>;
