use std::sync::Arc;

use askql::application::ports::CollaboratorError;
use askql::application::services::{AskJobRegistry, CandidatePolicy};
use askql::domain::{AskErrorCode, AskJob, AskResult, AskStage};

use crate::helpers::{
    ScriptedGenerator, StaticContextProvider, StubInterpreter, StubValidator, TEST_QUESTION,
    build_runner, generated,
};

async fn run_to_completion(
    interpreter: StubInterpreter,
    context_provider: StaticContextProvider,
    generator: ScriptedGenerator,
    validator: StubValidator,
    policy: CandidatePolicy,
) -> AskJob {
    let runner = build_runner(
        interpreter,
        context_provider,
        Arc::new(generator),
        Arc::new(validator),
        policy,
    );
    let registry = AskJobRegistry::new();
    let id = registry.create(TEST_QUESTION);
    let handle = registry.handle(id).unwrap();

    runner.run(&handle).await;

    registry.get(id).unwrap()
}

fn failure_code(job: &AskJob) -> AskErrorCode {
    job.result
        .as_ref()
        .and_then(|r| r.error())
        .map(|e| e.code)
        .expect("failed job should carry an error")
}

#[test]
fn given_budget_below_target_when_building_policy_then_raises_budget() {
    let policy = CandidatePolicy::new(3, 1);

    assert_eq!(policy.target_candidates, 3);
    assert_eq!(policy.attempt_budget, 3);
}

#[test]
fn given_zero_target_when_building_policy_then_asks_for_one_candidate() {
    let policy = CandidatePolicy::new(0, 0);

    assert_eq!(policy, CandidatePolicy::new(1, 1));
}

#[tokio::test]
async fn given_working_collaborators_when_running_then_finishes_with_candidates() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        ScriptedGenerator::statements(&["S1", "S2"]),
        StubValidator::accepting(),
        CandidatePolicy::new(2, 3),
    )
    .await;

    assert_eq!(job.stage, AskStage::Finished);
    let sqls: Vec<String> = job
        .result
        .unwrap()
        .candidates()
        .iter()
        .map(|c| c.sql.clone())
        .collect();
    assert_eq!(sqls, vec!["S1", "S2"]);
    assert_eq!(job.attempt_count, 2);
    assert_eq!(job.excluded_statements, vec!["S1", "S2"]);
    assert!(job.finished_at.is_some());
}

#[tokio::test]
async fn given_partial_candidates_when_budget_runs_out_then_still_finishes() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        ScriptedGenerator::statements(&["S1", "BAD"]),
        StubValidator::rejecting(&["BAD"]),
        CandidatePolicy::new(3, 3),
    )
    .await;

    assert_eq!(job.stage, AskStage::Finished);
    assert_eq!(job.result.unwrap().candidates().len(), 1);
    assert_eq!(job.attempt_count, 3);
}

#[tokio::test]
async fn given_only_invalid_sql_when_running_then_fails_with_no_relevant_sql() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        ScriptedGenerator::statements(&["BAD1", "BAD2"]),
        StubValidator::rejecting_all(),
        CandidatePolicy::new(2, 2),
    )
    .await;

    assert_eq!(job.stage, AskStage::Failed);
    assert_eq!(failure_code(&job), AskErrorCode::NoRelevantSql);
    let message = &job.result.as_ref().unwrap().error().unwrap().message;
    assert!(message.contains("2 attempts"), "{}", message);
    assert!(message.contains("unknown column in BAD2"), "{}", message);
}

#[tokio::test]
async fn given_unanswerable_question_when_running_then_fails_with_misleading_query() {
    let generator = ScriptedGenerator::statements(&["S1"]);
    let job = run_to_completion(
        StubInterpreter::unanswerable(),
        StaticContextProvider::with_tables(&["orders"]),
        generator,
        StubValidator::accepting(),
        CandidatePolicy::default(),
    )
    .await;

    assert_eq!(job.stage, AskStage::Failed);
    assert_eq!(failure_code(&job), AskErrorCode::MisleadingQuery);
    assert_eq!(job.attempt_count, 0);
}

#[tokio::test]
async fn given_empty_schema_context_when_running_then_fails_with_no_relevant_data() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::empty(),
        ScriptedGenerator::statements(&["S1"]),
        StubValidator::accepting(),
        CandidatePolicy::default(),
    )
    .await;

    assert_eq!(job.stage, AskStage::Failed);
    assert_eq!(failure_code(&job), AskErrorCode::NoRelevantData);
}

#[tokio::test]
async fn given_context_provider_failure_when_running_then_fails_without_retry() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::failing(CollaboratorError::Retriable("index busy".to_string())),
        ScriptedGenerator::statements(&["S1"]),
        StubValidator::accepting(),
        CandidatePolicy::default(),
    )
    .await;

    assert_eq!(job.stage, AskStage::Failed);
    assert_eq!(failure_code(&job), AskErrorCode::Others);
    assert_eq!(job.attempt_count, 0);
}

#[tokio::test]
async fn given_fatal_generator_failure_when_running_then_fails_with_diagnostic() {
    let job = run_to_completion(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        ScriptedGenerator::new(vec![Err(CollaboratorError::Fatal(
            "invalid api key".to_string(),
        ))]),
        StubValidator::accepting(),
        CandidatePolicy::default(),
    )
    .await;

    assert_eq!(job.stage, AskStage::Failed);
    assert_eq!(failure_code(&job), AskErrorCode::Others);
    assert!(
        job.result
            .unwrap()
            .error()
            .unwrap()
            .message
            .contains("invalid api key")
    );
}

#[tokio::test]
async fn given_cancel_before_run_when_running_then_stops_in_understanding() {
    let runner = build_runner(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        Arc::new(ScriptedGenerator::statements(&["S1"])),
        Arc::new(StubValidator::accepting()),
        CandidatePolicy::default(),
    );
    let registry = AskJobRegistry::new();
    let id = registry.create(TEST_QUESTION);
    registry.request_cancel(id).unwrap();

    runner.run(&registry.handle(id).unwrap()).await;

    let job = registry.get(id).unwrap();
    assert_eq!(job.stage, AskStage::Stopped);
    assert_eq!(job.result, Some(AskResult::Stopped));
    assert_eq!(job.attempt_count, 0);
}

#[tokio::test]
async fn given_job_already_terminal_when_running_then_keeps_original_outcome() {
    let runner = build_runner(
        StubInterpreter::answerable(),
        StaticContextProvider::with_tables(&["orders"]),
        Arc::new(ScriptedGenerator::new(vec![Ok(generated("S1"))])),
        Arc::new(StubValidator::accepting()),
        CandidatePolicy::new(1, 1),
    );
    let registry = AskJobRegistry::new();
    let id = registry.create(TEST_QUESTION);
    let handle = registry.handle(id).unwrap();
    handle.complete(AskResult::Stopped).unwrap();

    runner.run(&handle).await;

    assert_eq!(registry.get(id).unwrap().stage, AskStage::Stopped);
}
