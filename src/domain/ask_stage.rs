use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of an ask job. Stages only move forward; the last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AskStage {
    Understanding,
    Searching,
    Generating,
    Finished,
    Failed,
    Stopped,
}

impl AskStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AskStage::Understanding => "understanding",
            AskStage::Searching => "searching",
            AskStage::Generating => "generating",
            AskStage::Finished => "finished",
            AskStage::Failed => "failed",
            AskStage::Stopped => "stopped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AskStage::Finished | AskStage::Failed | AskStage::Stopped
        )
    }

    /// Position in the forward order; all terminal stages share the last rank.
    pub fn rank(&self) -> u8 {
        match self {
            AskStage::Understanding => 0,
            AskStage::Searching => 1,
            AskStage::Generating => 2,
            AskStage::Finished | AskStage::Failed | AskStage::Stopped => 3,
        }
    }

    pub fn can_transition_to(&self, next: AskStage) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl FromStr for AskStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "understanding" => Ok(AskStage::Understanding),
            "searching" => Ok(AskStage::Searching),
            "generating" => Ok(AskStage::Generating),
            "finished" => Ok(AskStage::Finished),
            "failed" => Ok(AskStage::Failed),
            "stopped" => Ok(AskStage::Stopped),
            _ => Err(format!("Invalid ask stage: {}", s)),
        }
    }
}

impl fmt::Display for AskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
