use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read counter")]
    CounterRead(#[source] StoreError),

    #[error("Failed to increment counter")]
    CounterIncrement(#[source] StoreError),
}

/// JSON body sent with every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The cause stays in the logs; clients only get the generic message.
        match &self {
            AppError::CounterRead(source) | AppError::CounterIncrement(source) => {
                tracing::error!(error = %source, "{}", self);
            }
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

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
    async fn test_read_error_is_500_with_message() {
        let response = AppError::CounterRead(StoreError::WorkerStopped).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to read counter");
    }

    #[tokio::test]
    async fn test_increment_error_hides_cause() {
        let response = AppError::CounterIncrement(StoreError::Timeout(5)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to increment counter");
        assert!(!body.to_string().contains("timed out"));
    }
}
