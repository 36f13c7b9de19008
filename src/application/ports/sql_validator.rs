use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid { normalized: String },
    Invalid { diagnostic: String },
}

#[async_trait]
pub trait SqlValidator: Send + Sync {
    /// Rejections are reported as [`Validation::Invalid`]; only an unreachable engine is an error.
    async fn validate(&self, sql: &str) -> Result<Validation, ValidatorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorError {
    #[error("query engine unavailable: {0}")]
    EngineUnavailable(String),
}
