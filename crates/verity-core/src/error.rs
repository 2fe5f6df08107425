use thiserror::Error;

/// Engine-wide error types for Verity.
///
/// The engine raises these and never degrades them into a partial result;
/// translating them into a user-visible response is the caller's job.
#[derive(Debug, Error)]
pub enum VerityError {
    /// Request-level rejection (missing content id, sources not a sequence).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single source is structurally malformed. Fails the whole request.
    #[error("Invalid source at index {index}: {reason}")]
    InvalidSource { index: usize, reason: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Policy configuration rejected by `EngineConfig::validate`.
    #[error("Config error: {0}")]
    Config(String),

    /// Evaluation exceeded the service-level deadline (milliseconds).
    #[error("Evaluation timed out after {0} ms")]
    Timeout(u64),

    /// A background evaluation task failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VerityError {
    /// Shorthand for building an `InvalidSource` error.
    pub fn invalid_source(index: usize, reason: impl Into<String>) -> Self {
        VerityError::InvalidSource {
            index,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VerityError {
    fn from(e: serde_json::Error) -> Self {
        VerityError::Serialization(e.to_string())
    }
}
