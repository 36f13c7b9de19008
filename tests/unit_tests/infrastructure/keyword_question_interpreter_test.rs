use askql::application::ports::QuestionInterpreter;
use askql::infrastructure::context::KeywordQuestionInterpreter;

#[tokio::test]
async fn given_padded_question_when_understanding_then_trims_and_accepts() {
    let understanding = KeywordQuestionInterpreter
        .understand("  top customers by revenue  ")
        .await
        .unwrap();

    assert!(understanding.answerable);
    assert_eq!(understanding.question, "top customers by revenue");
}

#[tokio::test]
async fn given_punctuation_only_when_understanding_then_is_unanswerable() {
    let understanding = KeywordQuestionInterpreter.understand(" ?!? ").await.unwrap();

    assert!(!understanding.answerable);
}
