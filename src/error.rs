// Engine error taxonomy.
//
// Every fallible engine operation (shingling, training, classification,
// decoding) returns one of these. The application layers (repository,
// pipeline, CLI) wrap them in anyhow, so callers that need to branch on the
// kind can still recover it with `err.downcast_ref::<EngineError>()`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Bad input: empty corpus, too few tokens, mismatched multiplicities,
    /// malformed encoded classifier, duplicate names.
    #[error("validation error: {0}")]
    Validation(String),

    /// A classifier id that the repository does not know about.
    #[error("classifier not found: {0}")]
    NotFound(String),

    /// A computation with no defined result (e.g. Jaccard of two empty sets).
    #[error("computation error: {0}")]
    Computation(String),

    #[error("no classifiers available in the current set")]
    EmptySet,
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }

    pub fn computation(message: impl Into<String>) -> Self {
        EngineError::Computation(message.into())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
