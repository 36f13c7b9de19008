use async_trait::async_trait;

use super::CollaboratorError;
use crate::domain::{Candidate, SchemaContext, SqlSample};

pub struct GenerationRequest<'a> {
    pub question: &'a str,
    pub context: &'a SchemaContext,
    /// Statements already tried for this question; the generator should avoid them.
    pub excluded: &'a [String],
    /// Accepted candidates so far; a non-empty list asks for a different angle.
    pub previous: &'a [Candidate],
    /// Question/SQL pairs resembling this question, if the context provider found any.
    pub samples: &'a [SqlSample],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub sql: String,
    pub summary: String,
}

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GeneratedSql, CollaboratorError>;
}
