use askql::domain::{
    AskError, AskErrorCode, AskJob, AskResult, AskStage, Candidate, StageTransitionError,
};

#[test]
fn given_new_job_when_created_then_starts_understanding_without_result() {
    let job = AskJob::new("how many books".to_string());

    assert_eq!(job.stage, AskStage::Understanding);
    assert!(job.result.is_none());
    assert!(job.finished_at.is_none());
    assert!(!job.cancel_requested);
    assert_eq!(job.attempt_count, 0);
    assert!(job.excluded_statements.is_empty());
}

#[test]
fn given_job_when_advancing_forward_then_updates_stage() {
    let mut job = AskJob::new("q".to_string());

    job.advance(AskStage::Searching).unwrap();
    job.advance(AskStage::Generating).unwrap();

    assert_eq!(job.stage, AskStage::Generating);
}

#[test]
fn given_generating_job_when_advancing_backward_then_rejects() {
    let mut job = AskJob::new("q".to_string());
    job.advance(AskStage::Generating).unwrap();

    let err = job.advance(AskStage::Searching).unwrap_err();

    assert_eq!(
        err,
        StageTransitionError::Backward {
            from: AskStage::Generating,
            to: AskStage::Searching,
        }
    );
    assert_eq!(job.stage, AskStage::Generating);
}

#[test]
fn given_job_when_advancing_to_terminal_stage_directly_then_rejects() {
    let mut job = AskJob::new("q".to_string());

    let err = job.advance(AskStage::Finished).unwrap_err();

    assert_eq!(
        err,
        StageTransitionError::TerminalWithoutResult(AskStage::Finished)
    );
    assert!(job.result.is_none());
}

#[test]
fn given_candidates_when_completing_then_sets_finished_stage_result_and_timestamp() {
    let mut job = AskJob::new("q".to_string());
    let candidates = vec![Candidate::valid(
        "SELECT 1".to_string(),
        "one".to_string(),
    )];

    job.complete(AskResult::Candidates(candidates.clone()))
        .unwrap();

    assert_eq!(job.stage, AskStage::Finished);
    assert_eq!(job.result, Some(AskResult::Candidates(candidates)));
    assert!(job.finished_at.is_some());
}

#[test]
fn given_terminal_job_when_completing_again_then_keeps_first_outcome() {
    let mut job = AskJob::new("q".to_string());
    job.complete(AskResult::Stopped).unwrap();
    let finished_at = job.finished_at;

    let err = job
        .complete(AskResult::Failure(AskError::new(
            AskErrorCode::Others,
            "late failure",
        )))
        .unwrap_err();

    assert_eq!(err, StageTransitionError::AlreadyTerminal(AskStage::Stopped));
    assert_eq!(job.stage, AskStage::Stopped);
    assert_eq!(job.result, Some(AskResult::Stopped));
    assert_eq!(job.finished_at, finished_at);
}

#[test]
fn given_repeated_statement_when_recording_attempts_then_counts_each_but_excludes_once() {
    let mut job = AskJob::new("q".to_string());

    job.record_attempt(Some("SELECT 1"));
    job.record_attempt(Some("SELECT 1"));
    job.record_attempt(None);
    job.record_attempt(Some("SELECT 2"));

    assert_eq!(job.attempt_count, 4);
    assert_eq!(job.excluded_statements, vec!["SELECT 1", "SELECT 2"]);
}
