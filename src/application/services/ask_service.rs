use std::sync::Arc;

use super::ask_job_registry::{AskJobHandle, AskJobRegistry, RegistryError};
use super::ask_job_runner::AskJobRunner;
use crate::domain::{AskError, AskErrorCode, AskJob, AskJobId, AskResult};

/// Entry point for submitting, polling and cancelling ask jobs.
pub struct AskService {
    registry: Arc<AskJobRegistry>,
    runner: Arc<AskJobRunner>,
}

impl AskService {
    pub fn new(registry: Arc<AskJobRegistry>, runner: Arc<AskJobRunner>) -> Self {
        Self { registry, runner }
    }

    /// Registers a job and starts executing it on the current tokio runtime.
    pub fn submit(&self, question: impl Into<String>) -> AskJobId {
        let id = self.registry.create(question);
        if let Some(handle) = self.registry.handle(id) {
            self.spawn(handle);
        }
        id
    }

    pub fn poll(&self, id: AskJobId) -> Result<AskJob, AskServiceError> {
        Ok(self.registry.get(id)?)
    }

    pub fn cancel(&self, id: AskJobId) -> Result<(), AskServiceError> {
        Ok(self.registry.request_cancel(id)?)
    }

    pub fn registry(&self) -> &Arc<AskJobRegistry> {
        &self.registry
    }

    fn spawn(&self, handle: AskJobHandle) {
        let runner = Arc::clone(&self.runner);
        let worker_handle = handle.clone();
        let worker = tokio::spawn(async move { runner.run(&worker_handle).await });

        // A panicking runner must still leave the job in a terminal stage.
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                tracing::error!(job_id = %handle.id(), error = %e, "Ask job task aborted");
                let failure = AskResult::Failure(AskError::new(
                    AskErrorCode::Others,
                    format!("ask job execution aborted: {}", e),
                ));
                if let Err(e) = handle.complete(failure) {
                    tracing::debug!(
                        job_id = %handle.id(),
                        error = %e,
                        "Aborted ask job was already terminal"
                    );
                }
            }
        });
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AskServiceError {
    #[error("ask job not found: {0}")]
    NotFound(AskJobId),
    #[error("registry: {0}")]
    Registry(RegistryError),
}

impl From<RegistryError> for AskServiceError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::NotFound(id) => AskServiceError::NotFound(id),
            other => AskServiceError::Registry(other),
        }
    }
}
