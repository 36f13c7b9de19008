pub mod context;
pub mod engine;
pub mod llm;
pub mod observability;
