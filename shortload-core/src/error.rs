//! Workload error types

use shortload_http::HttpError;
use thiserror::Error;

/// Errors that stop a run
///
/// Individual failed checks are not errors; they are counted by the
/// [`CheckRecorder`](crate::CheckRecorder) and the run carries on.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Setup produced no usable tokens, so there is nothing to sample
    #[error("Token pool is empty; setup produced no usable tokens")]
    EmptyPool,

    /// Setup aborted under the fail-fast policy
    #[error("Provisioning call {index} failed: {reason}")]
    Provisioning { index: usize, reason: String },

    /// The run was interrupted before setup completed
    #[error("Run interrupted during setup")]
    Interrupted,

    /// HTTP client construction or transport error outside a check
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}

/// Result type alias for workload operations
pub type Result<T> = std::result::Result<T, WorkloadError>;
