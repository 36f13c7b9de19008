use std::sync::Arc;

use tracing::Instrument;

use super::ask_job_registry::AskJobHandle;
use super::diversity_controller::{
    DiversityController, DiversityError, DiversityOutcome, DiversityRequest,
};
use crate::application::ports::{CollaboratorError, ContextProvider, QuestionInterpreter};
use crate::domain::{AskError, AskErrorCode, AskResult, AskStage, Candidate};

/// How many candidates a job asks for and how many attempts it may spend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePolicy {
    pub target_candidates: usize,
    pub attempt_budget: usize,
}

impl CandidatePolicy {
    pub fn new(target_candidates: usize, attempt_budget: usize) -> Self {
        let target_candidates = target_candidates.max(1);
        if attempt_budget < target_candidates {
            tracing::warn!(
                target_candidates,
                attempt_budget,
                "Attempt budget below candidate target, raising it to the target"
            );
        }
        Self {
            target_candidates,
            attempt_budget: attempt_budget.max(target_candidates),
        }
    }
}

impl Default for CandidatePolicy {
    fn default() -> Self {
        Self::new(3, 5)
    }
}

enum Halt {
    Stopped,
    Failed(AskError),
}

impl From<Halt> for AskResult {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Stopped => AskResult::Stopped,
            Halt::Failed(error) => AskResult::Failure(error),
        }
    }
}

/// Drives one ask job from `understanding` to a terminal stage.
///
/// Cancellation is cooperative: it is checked before every stage and between generation
/// attempts, and an in-flight collaborator call is always allowed to finish.
pub struct AskJobRunner {
    interpreter: Arc<dyn QuestionInterpreter>,
    context_provider: Arc<dyn ContextProvider>,
    controller: DiversityController,
    policy: CandidatePolicy,
}

impl AskJobRunner {
    pub fn new(
        interpreter: Arc<dyn QuestionInterpreter>,
        context_provider: Arc<dyn ContextProvider>,
        controller: DiversityController,
        policy: CandidatePolicy,
    ) -> Self {
        Self {
            interpreter,
            context_provider,
            controller,
            policy,
        }
    }

    pub async fn run(&self, handle: &AskJobHandle) {
        let span = tracing::info_span!("ask_job", job_id = %handle.id());
        async {
            let result = match self.execute(handle).await {
                Err(Halt::Stopped) => {
                    tracing::info!(stage = %handle.stage(), "Ask job stopped by client");
                    AskResult::Stopped
                }
                _ if handle.is_cancel_requested() => {
                    tracing::info!(
                        stage = %handle.stage(),
                        "Ask job stopped by client during its last collaborator call"
                    );
                    AskResult::Stopped
                }
                Ok(candidates) => {
                    tracing::info!(candidates = candidates.len(), "Ask job finished");
                    AskResult::Candidates(candidates)
                }
                Err(halt) => {
                    let result = AskResult::from(halt);
                    if let Some(error) = result.error() {
                        tracing::warn!(code = %error.code, error = %error.message, "Ask job failed");
                    }
                    result
                }
            };

            if let Err(e) = handle.complete(result) {
                tracing::error!(error = %e, "Failed to record ask job outcome");
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, handle: &AskJobHandle) -> Result<Vec<Candidate>, Halt> {
        let question = handle.question();

        check_cancelled(handle)?;
        let understanding = self
            .interpreter
            .understand(&question)
            .await
            .map_err(|e| collaborator_failure(AskStage::Understanding, e))?;
        check_cancelled(handle)?;
        if !understanding.answerable {
            return Err(Halt::Failed(AskError::new(
                AskErrorCode::MisleadingQuery,
                "the question cannot be answered with SQL",
            )));
        }

        enter(handle, AskStage::Searching)?;
        let context = self
            .context_provider
            .retrieve(&understanding.question)
            .await
            .map_err(|e| collaborator_failure(AskStage::Searching, e))?;
        check_cancelled(handle)?;
        if context.is_empty() {
            return Err(Halt::Failed(AskError::new(
                AskErrorCode::NoRelevantData,
                "no relevant schema found for the question",
            )));
        }
        tracing::debug!(documents = context.documents.len(), "Schema context retrieved");

        enter(handle, AskStage::Generating)?;
        let request = DiversityRequest {
            question: &understanding.question,
            context: &context,
            target: self.policy.target_candidates,
            budget: self.policy.attempt_budget,
        };
        let token = handle.cancellation_token();
        let outcome = self
            .controller
            .run(&request, &token, |statement| handle.record_attempt(statement))
            .await
            .map_err(|DiversityError::Fatal(reason)| {
                Halt::Failed(AskError::new(AskErrorCode::Others, reason))
            })?;

        if outcome.cancelled || handle.is_cancel_requested() {
            return Err(Halt::Stopped);
        }
        if outcome.candidates.is_empty() {
            return Err(Halt::Failed(AskError::new(
                AskErrorCode::NoRelevantSql,
                exhaustion_diagnostic(&outcome),
            )));
        }
        Ok(outcome.candidates)
    }
}

fn check_cancelled(handle: &AskJobHandle) -> Result<(), Halt> {
    if handle.is_cancel_requested() {
        Err(Halt::Stopped)
    } else {
        Ok(())
    }
}

fn enter(handle: &AskJobHandle, stage: AskStage) -> Result<(), Halt> {
    check_cancelled(handle)?;
    handle
        .advance(stage)
        .map_err(|e| Halt::Failed(AskError::new(AskErrorCode::Others, e.to_string())))
}

fn collaborator_failure(stage: AskStage, error: CollaboratorError) -> Halt {
    Halt::Failed(AskError::new(
        AskErrorCode::Others,
        format!("{} stage failed: {}", stage, error),
    ))
}

fn exhaustion_diagnostic(outcome: &DiversityOutcome) -> String {
    let mut message = format!(
        "no valid SQL produced after {} attempts ({} rejected)",
        outcome.attempts,
        outcome.rejected.len()
    );
    if let Some(last) = &outcome.last_failure {
        message.push_str("; last failure: ");
        message.push_str(last);
    }
    message
}
