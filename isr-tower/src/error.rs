use std::error::Error;

use thiserror::Error;

/// Boxed body error.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error returned by [`IsrService`](crate::IsrService).
#[derive(Debug, Error)]
pub enum IsrServiceError<E> {
    /// The wrapped service failed.
    #[error("upstream service failed: {0:?}")]
    Upstream(E),
    /// A request or response body could not be read.
    #[error("failed to read body: {0}")]
    Body(BoxError),
}
