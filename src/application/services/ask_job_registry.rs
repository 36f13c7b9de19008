use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::domain::{AskJob, AskJobId, AskResult, AskStage, StageTransitionError};

struct AskJobEntry {
    job: RwLock<AskJob>,
    cancellation: CancellationToken,
}

impl AskJobEntry {
    fn snapshot(&self) -> AskJob {
        let mut job = self
            .job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        job.cancel_requested = self.cancellation.is_cancelled();
        job
    }

    fn with_job<R>(&self, f: impl FnOnce(&mut AskJob) -> R) -> R {
        let mut job = self.job.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut job)
    }

    fn is_terminal(&self) -> bool {
        self.job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_terminal()
    }

    fn finished_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .finished_at
            .is_some_and(|finished_at| finished_at < cutoff)
    }
}

/// Process-wide map of ask jobs.
///
/// Entries live in a sharded map so unrelated jobs never contend on one lock. Each job's
/// state sits behind its own lock, held only for the duration of a copy or a single field
/// update and never across an await.
#[derive(Default)]
pub struct AskJobRegistry {
    jobs: DashMap<AskJobId, Arc<AskJobEntry>>,
}

impl AskJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, question: impl Into<String>) -> AskJobId {
        let job = AskJob::new(question.into());
        let id = job.id;
        self.jobs.insert(
            id,
            Arc::new(AskJobEntry {
                job: RwLock::new(job),
                cancellation: CancellationToken::new(),
            }),
        );
        tracing::debug!(job_id = %id, "Ask job registered");
        id
    }

    pub fn get(&self, id: AskJobId) -> Result<AskJob, RegistryError> {
        self.entry(id)
            .map(|entry| entry.snapshot())
            .ok_or(RegistryError::NotFound(id))
    }

    /// Flags the job for cancellation. Repeated calls are no-ops.
    pub fn request_cancel(&self, id: AskJobId) -> Result<(), RegistryError> {
        let entry = self.entry(id).ok_or(RegistryError::NotFound(id))?;
        if !entry.cancellation.is_cancelled() {
            tracing::info!(job_id = %id, "Ask job cancellation requested");
            entry.cancellation.cancel();
        }
        Ok(())
    }

    pub fn evict(&self, id: AskJobId) -> Result<(), RegistryError> {
        if self
            .jobs
            .remove_if(&id, |_, entry| entry.is_terminal())
            .is_some()
        {
            tracing::debug!(job_id = %id, "Ask job evicted");
            return Ok(());
        }
        if self.jobs.contains_key(&id) {
            Err(RegistryError::StillRunning(id))
        } else {
            Err(RegistryError::NotFound(id))
        }
    }

    /// Removes terminal jobs that finished before `cutoff` and returns how many were removed.
    pub fn evict_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut evicted = 0;
        self.jobs.retain(|_, entry| {
            let expired = entry.finished_before(cutoff);
            if expired {
                evicted += 1;
            }
            !expired
        });
        evicted
    }

    pub fn handle(&self, id: AskJobId) -> Option<AskJobHandle> {
        self.entry(id).map(|entry| AskJobHandle { id, entry })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn entry(&self, id: AskJobId) -> Option<Arc<AskJobEntry>> {
        self.jobs.get(&id).map(|entry| Arc::clone(entry.value()))
    }
}

/// Write access to one job, held by the task executing it.
#[derive(Clone)]
pub struct AskJobHandle {
    id: AskJobId,
    entry: Arc<AskJobEntry>,
}

impl AskJobHandle {
    pub fn id(&self) -> AskJobId {
        self.id
    }

    pub fn snapshot(&self) -> AskJob {
        self.entry.snapshot()
    }

    pub fn question(&self) -> String {
        self.entry
            .job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .question
            .clone()
    }

    pub fn stage(&self) -> AskStage {
        self.entry
            .job
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .stage
    }

    pub fn advance(&self, next: AskStage) -> Result<(), StageTransitionError> {
        self.entry.with_job(|job| job.advance(next))?;
        tracing::debug!(job_id = %self.id, stage = %next, "Ask job stage transition");
        Ok(())
    }

    pub fn record_attempt(&self, statement: Option<&str>) {
        self.entry.with_job(|job| job.record_attempt(statement));
    }

    pub fn complete(&self, result: AskResult) -> Result<(), StageTransitionError> {
        let stage = result.stage();
        self.entry.with_job(|job| job.complete(result))?;
        tracing::debug!(job_id = %self.id, stage = %stage, "Ask job reached terminal stage");
        Ok(())
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.entry.cancellation.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.entry.cancellation.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("ask job not found: {0}")]
    NotFound(AskJobId),
    #[error("ask job still running: {0}")]
    StillRunning(AskJobId),
}
