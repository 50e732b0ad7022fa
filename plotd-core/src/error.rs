//! Error types for plot-history operations.

use thiserror::Error;

/// Result type for plot-history operations.
pub type PlotResult<T> = Result<T, PlotError>;

/// Errors that can occur in the plot-history engine.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A primitive arrived while no page was open for appending.
    #[error("No open page: device has been finalized or no page was started")]
    NoOpenPage,

    /// The selected page does not exist or has been evicted.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A caller-supplied argument was out of range or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A destructive operation was attempted on a device that is no longer
    /// the host's active plotting target.
    #[error("Device is not the active plotting target")]
    NotActive,
}
