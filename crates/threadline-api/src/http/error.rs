//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use threadline_types::error::{ExchangeFailure, InitializationFailure};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session setup failed; always reported as invalid credentials.
    InvalidCredentials(InitializationFailure),
    /// The send/poll/fetch sequence failed.
    Exchange(ExchangeFailure),
    SessionNotFound(Uuid),
    /// Another send is already pending on the session.
    SessionBusy,
    Validation(String),
}

impl From<InitializationFailure> for AppError {
    fn from(e: InitializationFailure) -> Self {
        AppError::InvalidCredentials(e)
    }
}

impl From<ExchangeFailure> for AppError {
    fn from(e: ExchangeFailure) -> Self {
        AppError::Exchange(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::InvalidCredentials(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            AppError::Exchange(e @ ExchangeFailure::TimedOut { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, "RUN_TIMEOUT", e.to_string())
            }
            AppError::Exchange(ExchangeFailure::Cancelled) => (
                StatusCode::GONE,
                "SESSION_CLOSED",
                "The session was closed while waiting for a reply".to_string(),
            ),
            AppError::Exchange(e @ ExchangeFailure::Remote(_)) => {
                (StatusCode::BAD_GATEWAY, "EXCHANGE_FAILED", e.to_string())
            }
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session {id} not found"),
            ),
            AppError::SessionBusy => (
                StatusCode::CONFLICT,
                "SESSION_BUSY",
                "A reply is still pending for this session".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::warn!(code, %message, "request failed");
        }
        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
