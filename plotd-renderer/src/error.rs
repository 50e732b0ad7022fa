//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering a page.
///
/// A render error never mutates or corrupts the source page; the caller
/// may retry with different parameters.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The effective canvas geometry is unusable.
    #[error("Invalid render geometry: {0}")]
    Geometry(String),

    /// A primitive references a resource that cannot be realized.
    #[error("Failed to realize resource: {0}")]
    Resource(String),
}
