/// Failure raised by an external collaborator of the ask pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("retriable collaborator failure: {0}")]
    Retriable(String),
    #[error("fatal collaborator failure: {0}")]
    Fatal(String),
}

impl CollaboratorError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, CollaboratorError::Retriable(_))
    }
}
