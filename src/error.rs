use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{Label, MessageResponse};

/// Body returned for requests that fail validation
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

pub const NOT_FOUND_MESSAGE: &str = "No data found.";
pub const STORE_ERROR_MESSAGE: &str = "An error occurred.";

/// Custom error type for API endpoints
///
/// Validation failures carry their reason back to the caller. Store failures
/// are logged here and answered with a generic message only.
#[derive(Debug)]
pub enum ApiError {
    /// Request body or query string did not match the schema
    InvalidRequest(String),
    /// No current record exists for the label
    NotFound(Label),
    /// Backing store operation failed
    StoreError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidRequest(reason) => {
                tracing::debug!("Rejected request: {}", reason);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Invalid request: {}", reason),
                    }),
                )
                    .into_response()
            }
            ApiError::NotFound(label) => {
                tracing::info!("No coordinate found for label: {}", label);
                (
                    StatusCode::NOT_FOUND,
                    Json(MessageResponse::new(NOT_FOUND_MESSAGE)),
                )
                    .into_response()
            }
            ApiError::StoreError(err) => {
                tracing::error!("Store operation failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(MessageResponse::new(STORE_ERROR_MESSAGE)),
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_store_error_detail_is_not_returned() {
        let response =
            ApiError::StoreError(anyhow::anyhow!("connection refused to 10.0.0.7")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": STORE_ERROR_MESSAGE }));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::NotFound(Label::Lamp).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "message": NOT_FOUND_MESSAGE }));
    }

    #[tokio::test]
    async fn test_invalid_request_body() {
        let response = ApiError::InvalidRequest("missing field `z`".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("missing field `z`"));
    }
}
