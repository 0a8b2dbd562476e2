//! Error types for LabTrack server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes exposed in API error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    StoreFailure = 2,
    NoSuchData = 3,
    BadValue = 4,
    StoreTimeout = 5,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Connection or transport failure talking to the entity store
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store query timed out after {0} ms")]
    Timeout(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<bson::ser::Error> for AppError {
    fn from(e: bson::ser::Error) -> Self {
        AppError::Internal(format!("document encoding failed: {}", e))
    }
}

impl From<regex::Error> for AppError {
    fn from(e: regex::Error) -> Self {
        AppError::BadRequest(format!("invalid pattern: {}", e))
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Store error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::StoreFailure,
                    "Store unavailable".to_string(),
                )
            }
            AppError::Timeout(ms) => {
                tracing::warn!(timeout_ms = ms, "Store query timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    ErrorCode::StoreTimeout,
                    self.to_string(),
                )
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_service_unavailable() {
        let response = AppError::StoreUnavailable("connection reset".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let response = AppError::Timeout(250).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    async fn body_of(error: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(error.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_codes_are_contiguous() {
        let cases = [
            (AppError::Internal("boom".into()), 1, "Failure"),
            (AppError::StoreUnavailable("down".into()), 2, "StoreFailure"),
            (AppError::NotFound("lab".into()), 3, "NoSuchData"),
            (AppError::BadRequest("age".into()), 4, "BadValue"),
            (AppError::Timeout(250), 5, "StoreTimeout"),
        ];
        for (error, code, name) in cases {
            let body = body_of(error).await;
            assert_eq!(body["code"], code);
            assert_eq!(body["error"], name);
        }
    }
}
