use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::services::AskServiceError;
use crate::domain::{AskJob, AskJobId, AskStage};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct SubmitAskRequest {
    pub query: String,
}

#[derive(Serialize)]
pub struct AskIdResponse {
    pub query_id: String,
}

#[derive(Deserialize)]
pub struct StopAskRequest {
    pub status: String,
}

#[derive(Serialize)]
pub struct AskResultResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<AskCandidateResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<AskErrorResponse>,
}

#[derive(Serialize)]
pub struct AskCandidateResponse {
    pub sql: String,
    pub summary: String,
}

#[derive(Serialize)]
pub struct AskErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<AskJob> for AskResultResponse {
    fn from(job: AskJob) -> Self {
        let response = job.result.as_ref().and_then(|result| {
            (job.stage == AskStage::Finished).then(|| {
                result
                    .candidates()
                    .iter()
                    .map(|c| AskCandidateResponse {
                        sql: c.sql.clone(),
                        summary: c.summary.clone(),
                    })
                    .collect()
            })
        });
        let error = job
            .result
            .as_ref()
            .and_then(|result| result.error())
            .map(|e| AskErrorResponse {
                code: e.code.as_str().to_string(),
                message: e.message.clone(),
            });

        Self {
            status: job.stage.as_str().to_string(),
            response,
            error,
        }
    }
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn parse_query_id(query_id: &str) -> Result<AskJobId, Response> {
    query_id.parse().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid query ID: {}", query_id),
        )
    })
}

fn service_error_response(error: AskServiceError) -> Response {
    match error {
        AskServiceError::NotFound(id) => {
            error_response(StatusCode::NOT_FOUND, format!("Query not found: {}", id))
        }
        other => {
            tracing::error!(error = %other, "Ask request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn submit_ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitAskRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Rejected ask request");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let query_id = state.ask_service.submit(request.query.as_str());
    tracing::info!(
        query_id = %query_id,
        question = %sanitize_prompt(&request.query),
        "Ask job submitted"
    );

    (
        StatusCode::OK,
        Json(AskIdResponse {
            query_id: query_id.to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ask_result_handler(
    State(state): State<AppState>,
    Path(query_id): Path<String>,
) -> Response {
    let id = match parse_query_id(&query_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.ask_service.poll(id) {
        Ok(job) => (StatusCode::OK, Json(AskResultResponse::from(job))).into_response(),
        Err(e) => service_error_response(e),
    }
}

#[tracing::instrument(skip(state, payload))]
pub async fn stop_ask_handler(
    State(state): State<AppState>,
    Path(query_id): Path<String>,
    payload: Result<Json<StopAskRequest>, JsonRejection>,
) -> Response {
    let id = match parse_query_id(&query_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if request.status != AskStage::Stopped.as_str() {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported status: {}", request.status),
        );
    }

    match state.ask_service.cancel(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(AskIdResponse {
                query_id: id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => service_error_response(e),
    }
}
