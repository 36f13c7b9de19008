use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::SchemaContext;

#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn retrieve(&self, question: &str) -> Result<SchemaContext, CollaboratorError>;
}
