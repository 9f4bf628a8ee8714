use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::collection::StoreError;
use crate::payment::PaymentError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized access".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden access".to_string()),
            AppError::Payment(e) => {
                tracing::error!("Payment error: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            AppError::Store(StoreError::ImmutableId) => {
                (StatusCode::BAD_REQUEST, StoreError::ImmutableId.to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Token(e) => {
                tracing::error!("Token signing error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
