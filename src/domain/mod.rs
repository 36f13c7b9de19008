mod ask_job;
mod ask_job_id;
mod ask_result;
mod ask_stage;
mod candidate;
mod schema_context;

pub use ask_job::{AskJob, StageTransitionError};
pub use ask_job_id::AskJobId;
pub use ask_result::{AskError, AskErrorCode, AskResult};
pub use ask_stage::AskStage;
pub use candidate::{Candidate, CandidateValidity, normalize_sql};
pub use schema_context::{SchemaContext, SchemaDocument, SqlSample};
