use chrono::{DateTime, Utc};

use super::{AskJobId, AskResult, AskStage};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageTransitionError {
    #[error("cannot move ask job from {from} to {to}")]
    Backward { from: AskStage, to: AskStage },
    #[error("ask job already reached terminal stage {0}")]
    AlreadyTerminal(AskStage),
    #[error("terminal stage {0} must be reached through a result")]
    TerminalWithoutResult(AskStage),
}

#[derive(Debug, Clone)]
pub struct AskJob {
    pub id: AskJobId,
    pub question: String,
    pub stage: AskStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub cancel_requested: bool,
    pub result: Option<AskResult>,
    pub attempt_count: usize,
    pub excluded_statements: Vec<String>,
}

impl AskJob {
    pub fn new(question: String) -> Self {
        let now = Utc::now();
        Self {
            id: AskJobId::new(),
            question,
            stage: AskStage::Understanding,
            created_at: now,
            updated_at: now,
            finished_at: None,
            cancel_requested: false,
            result: None,
            attempt_count: 0,
            excluded_statements: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Moves to a later non-terminal stage.
    pub fn advance(&mut self, next: AskStage) -> Result<(), StageTransitionError> {
        if next.is_terminal() {
            return Err(StageTransitionError::TerminalWithoutResult(next));
        }
        self.check_transition(next)?;
        self.stage = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the terminal stage, the result and `finished_at` together.
    pub fn complete(&mut self, result: AskResult) -> Result<(), StageTransitionError> {
        let next = result.stage();
        self.check_transition(next)?;
        let now = Utc::now();
        self.stage = next;
        self.result = Some(result);
        self.finished_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Counts one generation attempt and remembers the statement it produced, if any.
    pub fn record_attempt(&mut self, statement: Option<&str>) {
        self.attempt_count += 1;
        if let Some(statement) = statement {
            if !self.excluded_statements.iter().any(|s| s == statement) {
                self.excluded_statements.push(statement.to_string());
            }
        }
        self.updated_at = Utc::now();
    }

    fn check_transition(&self, next: AskStage) -> Result<(), StageTransitionError> {
        if self.stage.is_terminal() {
            return Err(StageTransitionError::AlreadyTerminal(self.stage));
        }
        if !self.stage.can_transition_to(next) {
            return Err(StageTransitionError::Backward {
                from: self.stage,
                to: next,
            });
        }
        Ok(())
    }
}
