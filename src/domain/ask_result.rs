use std::fmt;
use std::str::FromStr;

use super::{AskStage, Candidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AskErrorCode {
    MisleadingQuery,
    NoRelevantData,
    NoRelevantSql,
    Others,
}

impl AskErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AskErrorCode::MisleadingQuery => "MISLEADING_QUERY",
            AskErrorCode::NoRelevantData => "NO_RELEVANT_DATA",
            AskErrorCode::NoRelevantSql => "NO_RELEVANT_SQL",
            AskErrorCode::Others => "OTHERS",
        }
    }
}

impl FromStr for AskErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MISLEADING_QUERY" => Ok(AskErrorCode::MisleadingQuery),
            "NO_RELEVANT_DATA" => Ok(AskErrorCode::NoRelevantData),
            "NO_RELEVANT_SQL" => Ok(AskErrorCode::NoRelevantSql),
            "OTHERS" => Ok(AskErrorCode::Others),
            _ => Err(format!("Invalid ask error code: {}", s)),
        }
    }
}

impl fmt::Display for AskErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskError {
    pub code: AskErrorCode,
    pub message: String,
}

impl AskError {
    pub fn new(code: AskErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Terminal outcome of an ask job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskResult {
    Candidates(Vec<Candidate>),
    Failure(AskError),
    Stopped,
}

impl AskResult {
    pub fn stage(&self) -> AskStage {
        match self {
            AskResult::Candidates(_) => AskStage::Finished,
            AskResult::Failure(_) => AskStage::Failed,
            AskResult::Stopped => AskStage::Stopped,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        match self {
            AskResult::Candidates(candidates) => candidates,
            AskResult::Failure(_) | AskResult::Stopped => &[],
        }
    }

    pub fn error(&self) -> Option<&AskError> {
        match self {
            AskResult::Failure(error) => Some(error),
            AskResult::Candidates(_) | AskResult::Stopped => None,
        }
    }
}
