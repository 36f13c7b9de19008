use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{SqlValidator, Validation, ValidatorError};
use crate::domain::normalize_sql;

/// Validates statements by asking the query engine for a dry-run plan.
pub struct HttpSqlValidator {
    client: Client,
    dry_run_url: String,
}

#[derive(Serialize)]
struct DryRunRequest<'a> {
    sql: &'a str,
}

#[derive(Deserialize, Default)]
struct DryRunResponse {
    #[serde(default)]
    sql: Option<String>,
}

impl HttpSqlValidator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ValidatorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ValidatorError::EngineUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            dry_run_url: format!("{}/v1/dry-run", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SqlValidator for HttpSqlValidator {
    async fn validate(&self, sql: &str) -> Result<Validation, ValidatorError> {
        let response = self
            .client
            .post(&self.dry_run_url)
            .json(&DryRunRequest { sql })
            .send()
            .await
            .map_err(|e| ValidatorError::EngineUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let normalized = serde_json::from_str::<DryRunResponse>(&body)
                .unwrap_or_default()
                .sql
                .map(|engine_sql| normalize_sql(&engine_sql))
                .unwrap_or_else(|| normalize_sql(sql));
            return Ok(Validation::Valid { normalized });
        }

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let diagnostic = if body.trim().is_empty() {
                format!("engine rejected statement with HTTP {}", status)
            } else {
                body.trim().to_string()
            };
            return Ok(Validation::Invalid { diagnostic });
        }

        Err(ValidatorError::EngineUnavailable(format!(
            "HTTP {}: {}",
            status, body
        )))
    }
}
