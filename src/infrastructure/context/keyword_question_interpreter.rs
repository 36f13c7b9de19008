use async_trait::async_trait;

use crate::application::ports::{CollaboratorError, QuestionInterpreter, Understanding};

/// Accepts any question that contains at least one alphanumeric character.
pub struct KeywordQuestionInterpreter;

#[async_trait]
impl QuestionInterpreter for KeywordQuestionInterpreter {
    async fn understand(&self, question: &str) -> Result<Understanding, CollaboratorError> {
        let question = question.trim();
        Ok(Understanding {
            question: question.to_string(),
            answerable: question.chars().any(char::is_alphanumeric),
        })
    }
}
