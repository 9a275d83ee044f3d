//! Dispatch errors and their HTTP status codes.
//!
//! # Design Decisions
//! - Not-found is the common case and maps to 404 without an error log
//! - A missing root Route is a deployment error: 500 plus an error log
//! - Internal details never reach the response body

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::handlers::HandleError;
use crate::routing::RouteError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error("Request path is not UTF-8 once decoded")]
    InvalidPath,

    #[error("Dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Handle(HandleError::NotFound { .. }) => StatusCode::NOT_FOUND,
            DispatchError::Handle(HandleError::NotImplemented) => StatusCode::NOT_IMPLEMENTED,
            DispatchError::InvalidPath => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::Handle(HandleError::NotFound { .. }) => "not_found",
            DispatchError::Handle(HandleError::NotImplemented) => "not_implemented",
            DispatchError::Route(RouteError::NoMatchingRoot { .. }) => "no_root",
            DispatchError::InvalidPath => "bad_path",
            _ => "error",
        }
    }

    fn public_message(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::NOT_IMPLEMENTED => "Not Implemented",
            StatusCode::BAD_REQUEST => "Bad Request",
            _ => "Internal Server Error",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
