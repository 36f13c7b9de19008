use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::application::ports::{LlmClient, LlmClientError};

/// Replays canned replies in order; once drained it keeps returning the last one.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
}

impl MockLlmClient {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, LlmClientError> {
        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.ok_or_else(|| LlmClientError::InvalidResponse("no scripted reply".to_string()))
    }
}
