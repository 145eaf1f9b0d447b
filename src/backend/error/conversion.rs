/**
 * Error Conversion
 *
 * Renders `BackendError` as an HTTP response so handlers can return it
 * directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 *
 * Server errors are logged here with their full detail before the generic
 * message goes out.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::types::BackendError;

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }

        let body = ErrorBody {
            error: self.message(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes
pub async fn not_found_fallback() -> Response {
    let body = ErrorBody {
        error: "route not found".to_string(),
        status: StatusCode::NOT_FOUND.as_u16(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = BackendError::EmptyCart.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = body_of(response).await;
        assert_eq!(body, ErrorBody { error: "cart is empty".to_string(), status: 400 });
    }

    #[tokio::test]
    async fn test_internal_error_is_generic() {
        let response = BackendError::internal("connection reset by peer").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert!(!body.error.contains("connection reset"));
        assert_eq!(body.status, 500);
    }

    #[tokio::test]
    async fn test_not_found_fallback() {
        let body = body_of(not_found_fallback().await).await;
        assert_eq!(body.status, 404);
    }
}
