//! Error types for the cartnotify server.
//!
//! This module provides custom error types that implement `IntoResponse`
//! for seamless integration with Axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cartnotify_worker_pool::StoreError;
use serde_json::json;
use thiserror::Error;

/// Application-level errors for the HTTP API.
#[derive(Error, Debug)]
pub enum AppError {
    /// Event store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status this error is rendered with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store error");
                self.to_string()
            }
            AppError::Validation(msg) | AppError::BadRequest(msg) => msg.clone(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
