// ============================================================================
// Error Handling - HTTP Error Responses and Chart Shaping Errors
// ============================================================================
//
// Downstream failures (completion service, database) are logged with full
// detail server-side and returned to clients as fixed, opaque messages:
//
//   completion service failure  -> 502 "Error processing query"
//   database failure            -> 500 "Database query error"
//
// Client mistakes (bad JSON, blank question, unknown chart type) and shaping
// failures carry a developer-controlled message.
//
// Every error body has the same shape: { "error": <message>, "status": <code> }
//
// ============================================================================

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Message shown when a query produced no rows
pub const EMPTY_RESULT_MESSAGE: &str = "No results found";
/// Message shown when the completion service failed or returned nothing usable
pub const UPSTREAM_COMPLETION_MESSAGE: &str = "Error processing query";
/// Message shown when executing the generated SQL failed
pub const UPSTREAM_DATABASE_MESSAGE: &str = "Database query error";

/// Failures while turning query rows into a chart dataset
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("{}", EMPTY_RESULT_MESSAGE)]
    EmptyResult,

    #[error("Result needs at least two columns to chart, found {found}")]
    MissingValueField { found: usize },

    #[error("Unknown result field: {0}")]
    UnknownField(String),

    #[error("Row {row}: value '{raw}' in field '{field}' is not numeric")]
    NonNumericValue {
        row: usize,
        field: String,
        raw: String,
    },

    #[error("Invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    #[error("Unknown chart type: {0}")]
    UnknownChartKind(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] JsonRejection),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("No SQL statement found in completion response")]
    SqlExtraction,

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::Json(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Completion(_) | AppError::SqlExtraction => StatusCode::BAD_GATEWAY,
            AppError::Chart(ChartError::EmptyResult) => StatusCode::BAD_REQUEST,
            AppError::Chart(ChartError::UnknownChartKind(_)) => StatusCode::BAD_REQUEST,
            AppError::Chart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                UPSTREAM_DATABASE_MESSAGE.to_string()
            }
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::Json(_) => "Invalid JSON".to_string(),
            AppError::Completion(detail) => {
                tracing::error!("Completion service error: {}", detail);
                UPSTREAM_COMPLETION_MESSAGE.to_string()
            }
            AppError::SqlExtraction => {
                tracing::error!("Completion response contained no SQL statement");
                UPSTREAM_COMPLETION_MESSAGE.to_string()
            }
            AppError::Chart(err) => err.to_string(),
            AppError::BadRequest(msg) => msg,
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_database_error_is_opaque() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], UPSTREAM_DATABASE_MESSAGE);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn test_completion_error_hides_detail() {
        let response =
            AppError::Completion("401 invalid x-api-key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"], UPSTREAM_COMPLETION_MESSAGE);
        assert!(!body.to_string().contains("x-api-key"));
    }

    #[tokio::test]
    async fn test_empty_result_message() {
        let response = AppError::from(ChartError::EmptyResult).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], EMPTY_RESULT_MESSAGE);
    }

    #[test]
    fn test_non_numeric_value_is_unprocessable() {
        let err = AppError::from(ChartError::NonNumericValue {
            row: 2,
            field: "total".to_string(),
            raw: "n/a".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
