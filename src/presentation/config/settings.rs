use config::{Config, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub engine: EngineSettings,
    pub schema: SchemaSettings,
    pub ask: AskSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    /// Extra guidance appended to the SQL rules in every generation prompt.
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSettings {
    pub path: String,
    pub top_k: usize,
    /// Optional JSON file of `{ "question", "sql" }` examples.
    #[serde(default)]
    pub samples_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskSettings {
    pub target_candidates: usize,
    pub attempt_budget: usize,
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json_format: bool,
}

impl Settings {
    /// Layers defaults, `appsettings.{environment}` and `APP_`-prefixed variables
    /// (`APP_ASK__ATTEMPT_BUDGET=8` sets `ask.attempt_budget`).
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5556_i64)?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.api_key", "")?
            .set_default("llm.model", "gpt-4o-mini")?
            .set_default("llm.max_tokens", 4096_i64)?
            .set_default("llm.temperature", 0.0_f64)?
            .set_default("engine.url", "http://localhost:8080")?
            .set_default("engine.timeout_secs", 30_i64)?
            .set_default("schema.path", "schema.json")?
            .set_default("schema.top_k", 10_i64)?
            .set_default("ask.target_candidates", 3_i64)?
            .set_default("ask.attempt_budget", 5_i64)?
            .set_default("ask.retention_secs", 3600_i64)?
            .set_default("ask.sweep_interval_secs", 60_i64)?
            .set_default("logging.level", "info,askql=debug,tower_http=debug")?
            .set_default("logging.json_format", false)?
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
