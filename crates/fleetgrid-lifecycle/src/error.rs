//! Lifecycle error types.
//!
//! Each terminal outcome is its own variant so callers can tell a
//! rejected submission from a convergence timeout from a bad name.

use fleetgrid_client::ApiError;
use fleetgrid_core::{NameError, RenderError};
use thiserror::Error;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    InvalidNameFormat(#[from] NameError),

    #[error("failed to render unit {unit}: {source}")]
    Render {
        unit: String,
        #[source]
        source: RenderError,
    },

    #[error("unit {unit} was not accepted after {attempts} attempt(s): {source}")]
    SubmitFailed {
        unit: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("unit {unit} could not be deleted after {attempts} attempt(s): {source}")]
    DeleteFailed {
        unit: String,
        attempts: u32,
        #[source]
        source: ApiError,
    },

    #[error("container {unit} failed to start ({failures} failed observations)")]
    StartAborted { unit: String, failures: u32 },

    #[error("container {unit} timed out on start after {iterations} polls")]
    StartTimeout { unit: String, iterations: u32 },

    #[error("timeout on destroy: unit {unit} still present after {iterations} polls")]
    DestroyTimeout { unit: String, iterations: u32 },

    #[error("{operation} is not supported by the scheduler")]
    NotSupported { operation: &'static str },

    #[error(transparent)]
    Api(#[from] ApiError),
}
