use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::process::ExecutionError;
use crate::store::StoreError;

/// Errors surfaced to the http caller as plain text with a matching status.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The `{id}` path segment is not an integer.
    #[error("invalid command id: {0:?}")]
    InvalidId(String),
    #[error("command {0} not found")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("execution error: {0}")]
    Execution(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::debug!(status = status.as_u16(); "{self}");
        }
        (status, self.to_string()).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Storage(e) => Self::Storage(e.to_string()),
        }
    }
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        Self::Execution(err.to_string())
    }
}

/// Parses the `{id}` path segment.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::InvalidId(raw.to_owned()))
}
