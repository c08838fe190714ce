// Typed failures for the recommendation core.
//
// Everything inside the engine is deterministic and local, so there are only
// three ways a request can fail. Collaborators (HTTP handlers, the CLI) decide
// how to render each one; the engine never falls back to made-up results.

use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, RecommendError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    /// The catalog (or the engine limits) can't be used at all.
    /// Raised while building a snapshot, so it aborts startup or a reload.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown product, or a user with no purchase history.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request can't produce a profile to rank against.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RecommendError {
    /// Stable, machine-readable reason code for "no recommendations" responses.
    pub fn reason_code(&self) -> &'static str {
        match self {
            RecommendError::Configuration(_) => "configuration_error",
            RecommendError::NotFound(_) => "not_found",
            RecommendError::InvalidInput(_) => "invalid_input",
        }
    }
}
