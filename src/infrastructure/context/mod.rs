mod in_memory_schema_provider;
mod keyword_question_interpreter;

pub use in_memory_schema_provider::{InMemorySchemaProvider, SchemaLoadError};
pub use keyword_question_interpreter::KeywordQuestionInterpreter;
