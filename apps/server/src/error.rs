use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Log `cause` and hide it behind a short client-facing `message`.
    pub fn upstream(message: &str, cause: impl Display) -> Self {
        tracing::error!("{}: {}", message, cause);
        ApiError::Internal(message.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason),
        };
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn bad_request_carries_reason() {
        let (status, body) = body_of(ApiError::BadRequest("Trading pair is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Trading pair is required"}));
    }

    #[tokio::test]
    async fn upstream_hides_cause() {
        let (status, body) =
            body_of(ApiError::upstream("Failed to fetch prices", "HTTP 503 from upstream")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch prices");
    }
}
