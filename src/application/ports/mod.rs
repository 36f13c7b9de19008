mod collaborator_error;
mod context_provider;
mod llm_client;
mod question_interpreter;
mod sql_generator;
mod sql_validator;

pub use collaborator_error::CollaboratorError;
pub use context_provider::ContextProvider;
pub use llm_client::{LlmClient, LlmClientError};
pub use question_interpreter::{QuestionInterpreter, Understanding};
pub use sql_generator::{GeneratedSql, GenerationRequest, SqlGenerator};
pub use sql_validator::{SqlValidator, Validation, ValidatorError};
