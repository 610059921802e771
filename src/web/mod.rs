//! HTTP surface for items.
//!
//! Handlers are thin: they validate drafts, call the store or the batch
//! processor, and map errors through [`WebError`].

pub mod app;
pub mod handlers;
pub mod state;

pub use app::build_router;
pub use state::AppState;

use crate::core::{ErrorMessage, ItemError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    /// Field-level input violations, returned as an `ErrorMessage` body.
    Validation(ErrorMessage),
    NotFound(String),
    Storage(String),
    Internal(String),
}

impl From<ItemError> for WebError {
    fn from(err: ItemError) -> Self {
        match err {
            ItemError::NotFound(id) => Self::NotFound(format!("item {id} not found")),
            ItemError::Storage(message) => Self::Storage(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ErrorMessage> for WebError {
    fn from(errors: ErrorMessage) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "not_found"),
            WebError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, "storage_error"),
            WebError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, "internal_error"),
        };

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
