use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    CollaboratorError, GenerationRequest, SqlGenerator, SqlValidator, Validation,
};
use crate::domain::{Candidate, SchemaContext};

pub struct DiversityRequest<'a> {
    pub question: &'a str,
    pub context: &'a SchemaContext,
    /// Number of distinct valid candidates wanted.
    pub target: usize,
    /// Maximum number of generate/validate attempts.
    pub budget: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DiversityOutcome {
    pub candidates: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    pub attempts: usize,
    pub exhausted: bool,
    pub cancelled: bool,
    pub last_failure: Option<String>,
}

/// Collects distinct valid SQL candidates by generating, validating and excluding
/// previously tried statements from the next generation.
pub struct DiversityController {
    generator: Arc<dyn SqlGenerator>,
    validator: Arc<dyn SqlValidator>,
}

impl DiversityController {
    pub fn new(generator: Arc<dyn SqlGenerator>, validator: Arc<dyn SqlValidator>) -> Self {
        Self {
            generator,
            validator,
        }
    }

    /// `on_attempt` is called once per attempt with the statement it produced, if any.
    pub async fn run<F>(
        &self,
        request: &DiversityRequest<'_>,
        cancellation: &CancellationToken,
        mut on_attempt: F,
    ) -> Result<DiversityOutcome, DiversityError>
    where
        F: FnMut(Option<&str>) + Send,
    {
        let mut excluded: Vec<String> = Vec::new();
        let mut accepted: HashSet<String> = HashSet::new();
        let mut outcome = DiversityOutcome::default();

        while outcome.attempts < request.budget && outcome.candidates.len() < request.target {
            if cancellation.is_cancelled() {
                tracing::info!(attempts = outcome.attempts, "Candidate generation cancelled");
                outcome.cancelled = true;
                break;
            }
            outcome.attempts += 1;
            let attempt = outcome.attempts;

            let generation = GenerationRequest {
                question: request.question,
                context: request.context,
                excluded: &excluded,
                previous: &outcome.candidates,
                samples: &request.context.samples,
            };
            let generated = match self.generator.generate(&generation).await {
                Ok(generated) => generated,
                Err(CollaboratorError::Retriable(reason)) => {
                    tracing::warn!(attempt, error = %reason, "SQL generation failed, retrying");
                    on_attempt(None);
                    outcome.last_failure = Some(reason);
                    continue;
                }
                Err(CollaboratorError::Fatal(reason)) => {
                    on_attempt(None);
                    return Err(DiversityError::Fatal(reason));
                }
            };

            on_attempt(Some(&generated.sql));
            if excluded.contains(&generated.sql) {
                tracing::debug!(attempt, "Generator repeated an excluded statement");
                continue;
            }
            excluded.push(generated.sql.clone());

            match self.validator.validate(&generated.sql).await {
                Ok(Validation::Valid { normalized }) => {
                    if accepted.insert(normalized) {
                        tracing::debug!(attempt, "Accepted SQL candidate");
                        outcome
                            .candidates
                            .push(Candidate::valid(generated.sql, generated.summary));
                    } else {
                        tracing::debug!(attempt, "Discarded duplicate SQL candidate");
                    }
                }
                Ok(Validation::Invalid { diagnostic }) => {
                    tracing::debug!(attempt, diagnostic = %diagnostic, "Rejected SQL candidate");
                    outcome.last_failure = Some(diagnostic.clone());
                    outcome.rejected.push(Candidate::invalid(
                        generated.sql,
                        generated.summary,
                        diagnostic,
                    ));
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "SQL validation unavailable, retrying");
                    outcome.last_failure = Some(e.to_string());
                }
            }
        }

        outcome.exhausted = !outcome.cancelled && outcome.candidates.len() < request.target;
        Ok(outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiversityError {
    #[error("sql generation failed: {0}")]
    Fatal(String),
}
