use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Select at least one ingredient")]
    EmptySelection,

    #[error("Recipe generation took too long, please try again")]
    GenerationTimeout,

    #[error("Recipe service returned status {0}")]
    GenerationFailed(u16),

    #[error("Could not reach the recipe service: {0}")]
    ExternalServiceError(String),

    #[error("Invalid response from the recipe service: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Whether the failure came from the generation call itself, as opposed
    /// to local validation or persistence.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            CoreError::GenerationTimeout
                | CoreError::GenerationFailed(_)
                | CoreError::ExternalServiceError(_)
                | CoreError::InvalidResponse(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}
