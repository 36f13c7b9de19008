use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use askql::application::services::{
    AskJobRegistry, AskJobRunner, AskService, CandidatePolicy, DiversityController, JobReaper,
};
use askql::infrastructure::context::{InMemorySchemaProvider, KeywordQuestionInterpreter};
use askql::infrastructure::engine::HttpSqlValidator;
use askql::infrastructure::llm::{LlmSqlGenerator, OpenAiClient, PromptOptions};
use askql::infrastructure::observability::{TracingConfig, init_tracing};
use askql::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(
        &TracingConfig {
            environment: environment.to_string(),
            json_format: settings.logging.json_format,
            default_filter: settings.logging.level.clone(),
        },
        settings.server.port,
    );

    let llm_client = Arc::new(OpenAiClient::new(
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        settings.llm.max_tokens,
        settings.llm.temperature,
    ));
    let generator = Arc::new(LlmSqlGenerator::with_options(
        llm_client,
        PromptOptions {
            instructions: settings.llm.instructions.clone(),
            ..PromptOptions::default()
        },
    ));
    let validator = Arc::new(HttpSqlValidator::new(
        &settings.engine.url,
        Duration::from_secs(settings.engine.timeout_secs),
    )?);
    let mut context_provider =
        InMemorySchemaProvider::from_file(&settings.schema.path, settings.schema.top_k).await?;
    tracing::info!(
        path = %settings.schema.path,
        documents = context_provider.len(),
        "Schema documents loaded"
    );
    if let Some(samples_path) = &settings.schema.samples_path {
        let samples = InMemorySchemaProvider::load_samples(samples_path).await?;
        tracing::info!(path = %samples_path, samples = samples.len(), "SQL samples loaded");
        context_provider = context_provider.with_samples(samples);
    }
    let context_provider = Arc::new(context_provider);

    let runner = Arc::new(AskJobRunner::new(
        Arc::new(KeywordQuestionInterpreter),
        context_provider,
        DiversityController::new(generator, validator),
        CandidatePolicy::new(settings.ask.target_candidates, settings.ask.attempt_budget),
    ));
    let registry = Arc::new(AskJobRegistry::new());
    let ask_service = Arc::new(AskService::new(Arc::clone(&registry), runner));

    let shutdown = CancellationToken::new();
    let reaper = JobReaper::new(
        Arc::clone(&registry),
        Duration::from_secs(settings.ask.retention_secs),
        Duration::from_secs(settings.ask.sweep_interval_secs),
    );
    let reaper_task = tokio::spawn(reaper.run(shutdown.clone()));

    let router = create_router(AppState { ask_service });

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    shutdown.cancel();
    reaper_task.await?;

    Ok(())
}
