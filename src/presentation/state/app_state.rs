use std::sync::Arc;

use crate::application::services::AskService;

#[derive(Clone)]
pub struct AppState {
    pub ask_service: Arc<AskService>,
}
