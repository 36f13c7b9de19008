use std::time::Duration;

use askql::application::ports::{SqlValidator, Validation, ValidatorError};
use askql::infrastructure::engine::HttpSqlValidator;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};

use super::stub_server::serve;

async fn dry_run(Json(body): Json<Value>) -> (StatusCode, String) {
    let sql = body["sql"].as_str().unwrap_or_default().to_string();
    if sql.contains("missing_column") {
        (
            StatusCode::BAD_REQUEST,
            "column missing_column not found".to_string(),
        )
    } else if sql.contains("crash") {
        (StatusCode::INTERNAL_SERVER_ERROR, "engine crashed".to_string())
    } else {
        (
            StatusCode::OK,
            json!({ "sql": format!("{};", sql.to_lowercase()) }).to_string(),
        )
    }
}

async fn validator() -> HttpSqlValidator {
    let base_url = serve(Router::new().route("/v1/dry-run", post(dry_run))).await;
    HttpSqlValidator::new(&base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn given_engine_accepts_when_validating_then_returns_engine_normalized_sql() {
    let validator = validator().await;

    let validation = validator.validate("SELECT  Id FROM Orders").await.unwrap();

    assert_eq!(
        validation,
        Validation::Valid {
            normalized: "select id from orders".to_string(),
        }
    );
}

#[tokio::test]
async fn given_engine_rejects_when_validating_then_returns_invalid_with_diagnostic() {
    let validator = validator().await;

    let validation = validator
        .validate("SELECT missing_column FROM orders")
        .await
        .unwrap();

    assert_eq!(
        validation,
        Validation::Invalid {
            diagnostic: "column missing_column not found".to_string(),
        }
    );
}

#[tokio::test]
async fn given_engine_error_when_validating_then_reports_unavailable() {
    let validator = validator().await;

    let err = validator.validate("SELECT crash").await.unwrap_err();

    assert!(matches!(err, ValidatorError::EngineUnavailable(_)));
}

#[tokio::test]
async fn given_unreachable_engine_when_validating_then_reports_unavailable() {
    let validator = HttpSqlValidator::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

    let err = validator.validate("SELECT 1").await.unwrap_err();

    assert!(matches!(err, ValidatorError::EngineUnavailable(_)));
}
