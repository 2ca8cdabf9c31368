//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stash_core::{InvalidKey, ResolveError, StoreError};
use std::time::Duration;
use thiserror::Error;

/// Nginx's "client closed request"
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::Store(e) => ApiError::Store(e),
            ResolveError::Cancelled => ApiError::Cancelled,
            ResolveError::DeadlineExceeded(limit) => ApiError::DeadlineExceeded(limit),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidKey(_) => (StatusCode::BAD_REQUEST, "invalid_key"),
            ApiError::Store(StoreError::Upstream(_)) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            ApiError::Cancelled => (
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST),
                "cancelled",
            ),
            ApiError::DeadlineExceeded(_) => (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": code
        }));
        (status, body).into_response()
    }
}
