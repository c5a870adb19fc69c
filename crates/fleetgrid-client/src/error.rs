//! Scheduler client error types.

use std::path::PathBuf;

use http::StatusCode;
use thiserror::Error;

pub type TransportResult<T> = Result<T, TransportError>;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures of the underlying connection, independent of the API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to scheduler socket {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("http handshake failed: {0}")]
    Handshake(#[source] hyper::Error),

    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] hyper::Error),

    #[error("connection to scheduler is closed")]
    Closed,
}

/// Errors returned by [`SchedulerClient`](crate::SchedulerClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to create unit {unit}: {status} - {body}")]
    SubmitFailed {
        unit: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to delete unit {unit}: {status} - {body}")]
    DeleteFailed {
        unit: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to retrieve state: {status} - {body}")]
    StateQueryFailed { status: StatusCode, body: String },

    #[error("failed to retrieve machines: {status} - {body}")]
    MachinesQueryFailed { status: StatusCode, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid scheduler request: {0}")]
    Request(#[from] http::Error),

    #[error("failed to encode unit submission: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode scheduler response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// Whether repeating the same call may succeed: connection failures
    /// and scheduler rejections. Malformed requests and undecodable
    /// responses will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::SubmitFailed { .. } | ApiError::DeleteFailed { .. }
        )
    }

    /// HTTP status of a rejected call, if the scheduler answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::SubmitFailed { status, .. }
            | ApiError::DeleteFailed { status, .. }
            | ApiError::StateQueryFailed { status, .. }
            | ApiError::MachinesQueryFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
