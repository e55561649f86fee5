use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::meeting::ErrorResponse;
use crate::services::store::StoreError;

/// Failures surfaced by the meeting API.
///
/// `NotFound` maps to 404 `{error}`; everything else is a generic
/// 500 `{error, details}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Meeting not found")]
    NotFound,

    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    #[error("invalid meeting payload: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: self.to_string(),
                    details: None,
                },
            ),
            ApiError::Store(_) | ApiError::InvalidBody(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Server error".to_string(),
                        details: Some(self.to_string()),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
