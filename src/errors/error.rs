// Start of file: /src/errors/error.rs

use axum::BoxError;
use thiserror::Error;

/// Failures of the error handler itself.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Bad plugin registration; raised at setup time, never deferred.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An integration callback failed. Not recovered.
    #[error("integration #{index} failed: {source}")]
    Integration {
        index: usize,
        #[source]
        source: BoxError,
    },
}

// End of file: /src/errors/error.rs
