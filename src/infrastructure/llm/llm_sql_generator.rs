use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::application::ports::{
    CollaboratorError, GeneratedSql, GenerationRequest, LlmClient, LlmClientError, SqlGenerator,
};

const SYSTEM_PROMPT: &str = "You translate analytics questions into a single ANSI SQL SELECT \
statement over the given schema. Use only tables and columns present in the schema. \
Reply with a JSON object of the form {\"sql\": \"...\", \"summary\": \"...\"} where summary \
describes what the query returns in one short sentence.";

#[derive(Deserialize)]
struct SqlReply {
    sql: String,
    #[serde(default)]
    summary: String,
}

/// Fixed SQL-writing rules placed in every generation prompt.
pub const DEFAULT_SQL_RULES: &str = "### SQL RULES ###
- Only produce SELECT statements; never INSERT, UPDATE, DELETE, DROP or ALTER.
- Only reference tables and columns that appear in the schema.
- Qualify column names with their table name or alias when more than one table is joined.
- Use the current time given below for relative dates such as \"last month\".
- Do not add a LIMIT unless the question asks for a bounded number of rows.";

/// Prompt inputs that stay fixed across requests.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub rules: String,
    /// Deployment-specific guidance appended after the rules.
    pub instructions: Option<String>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            rules: DEFAULT_SQL_RULES.to_string(),
            instructions: None,
        }
    }
}

/// Generates SQL candidates by prompting a language model.
pub struct LlmSqlGenerator<L: LlmClient> {
    llm_client: Arc<L>,
    options: PromptOptions,
}

impl<L: LlmClient> LlmSqlGenerator<L> {
    pub fn new(llm_client: Arc<L>) -> Self {
        Self::with_options(llm_client, PromptOptions::default())
    }

    pub fn with_options(llm_client: Arc<L>, options: PromptOptions) -> Self {
        Self {
            llm_client,
            options,
        }
    }
}

#[async_trait]
impl<L: LlmClient + 'static> SqlGenerator for LlmSqlGenerator<L> {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<GeneratedSql, CollaboratorError> {
        let prompt = build_user_prompt(request, &self.options, Utc::now());
        let reply = self
            .llm_client
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(map_llm_error)?;
        parse_reply(&reply)
    }
}

pub fn build_user_prompt(
    request: &GenerationRequest<'_>,
    options: &PromptOptions,
    now: DateTime<Utc>,
) -> String {
    let mut prompt = String::from("### DATABASE SCHEMA ###\n");
    for document in &request.context.documents {
        prompt.push_str(&document.ddl);
        prompt.push('\n');
    }

    if !request.excluded.is_empty() {
        prompt.push_str(
            "\n### EXCLUDED STATEMENTS ###\nDo not answer with any of these statements:\n",
        );
        for statement in request.excluded {
            prompt.push_str(statement);
            prompt.push('\n');
        }
    }

    prompt.push('\n');
    prompt.push_str(options.rules.trim_end());
    prompt.push('\n');
    if let Some(instructions) = options
        .instructions
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
    {
        prompt.push_str("\n### INSTRUCTIONS ###\n");
        prompt.push_str(instructions);
        prompt.push('\n');
    }

    if !request.samples.is_empty() {
        prompt.push_str("\n### SAMPLES ###\n");
        for sample in request.samples {
            prompt.push_str("Question: ");
            prompt.push_str(&sample.question);
            prompt.push_str("\nSQL: ");
            prompt.push_str(&sample.sql);
            prompt.push('\n');
        }
    }

    if !request.previous.is_empty() {
        prompt.push_str("\n### PREVIOUS QUERIES ###\n");
        for candidate in request.previous {
            prompt.push_str("SQL: ");
            prompt.push_str(&candidate.sql);
            prompt.push_str("\nSummary: ");
            prompt.push_str(&candidate.summary);
            prompt.push('\n');
        }
        prompt.push_str(
            "Give one different SQL statement that answers the question from a different angle.\n",
        );
    }

    prompt.push_str("\n### QUESTION ###\n");
    prompt.push_str(request.question);
    prompt.push_str("\nCurrent Time: ");
    prompt.push_str(&now.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    prompt.push('\n');
    prompt
}

pub fn parse_reply(reply: &str) -> Result<GeneratedSql, CollaboratorError> {
    let body = strip_code_fence(reply);
    let parsed: SqlReply = serde_json::from_str(body)
        .map_err(|e| CollaboratorError::Retriable(format!("unparseable model reply: {}", e)))?;

    let sql = parsed.sql.trim();
    if sql.is_empty() {
        return Err(CollaboratorError::Retriable(
            "model reply contained no SQL".to_string(),
        ));
    }

    Ok(GeneratedSql {
        sql: sql.to_string(),
        summary: parsed.summary.trim().to_string(),
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn map_llm_error(error: LlmClientError) -> CollaboratorError {
    match error {
        LlmClientError::Unauthorized(_) => CollaboratorError::Fatal(error.to_string()),
        LlmClientError::ApiRequestFailed(_)
        | LlmClientError::RateLimited
        | LlmClientError::InvalidResponse(_) => CollaboratorError::Retriable(error.to_string()),
    }
}
