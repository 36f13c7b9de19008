mod llm_sql_generator;
mod mock_llm_client;
mod openai_client;

pub use llm_sql_generator::{
    DEFAULT_SQL_RULES, LlmSqlGenerator, PromptOptions, build_user_prompt, parse_reply,
};
pub use mock_llm_client::MockLlmClient;
pub use openai_client::OpenAiClient;
