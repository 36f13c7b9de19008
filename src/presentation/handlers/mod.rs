mod asks;
mod health;

pub use asks::{
    AskCandidateResponse, AskErrorResponse, AskIdResponse, AskResultResponse, ErrorResponse,
    StopAskRequest, SubmitAskRequest, ask_result_handler, stop_ask_handler, submit_ask_handler,
};
pub use health::health_handler;
