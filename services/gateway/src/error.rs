use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{BrokerageError, ErrorKind};

use crate::users::DirectoryError;

/// Central error type for the Gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Brokerage(#[from] BrokerageError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::UsernameTaken(_) | DirectoryError::CustomerIdTaken(_) => {
                AppError::Conflict(err.to_string())
            }
            DirectoryError::CustomerIdsExhausted => AppError::InternalError(err.into()),
        }
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Brokerage(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                ErrorKind::InvalidState => (StatusCode::CONFLICT, "INVALID_STATE"),
                ErrorKind::InsufficientFunds => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FUNDS")
                }
                ErrorKind::InsufficientHoldings => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_HOLDINGS")
                }
                ErrorKind::AlreadyExists => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg,
            AppError::Brokerage(err) if status != StatusCode::INTERNAL_SERVER_ERROR => {
                err.to_string()
            }
            // Internal details stay in the log.
            other => {
                tracing::error!(error = ?other, "request failed");
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
