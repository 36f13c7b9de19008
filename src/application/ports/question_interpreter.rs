use async_trait::async_trait;

use super::CollaboratorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Understanding {
    pub question: String,
    pub answerable: bool,
}

#[async_trait]
pub trait QuestionInterpreter: Send + Sync {
    async fn understand(&self, question: &str) -> Result<Understanding, CollaboratorError>;
}
