//! Query engine error types.

use thiserror::Error;

/// Alias for `Result<T, QueryError>`.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur when computing a birthday view.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An invalid argument was provided (e.g. a zero-day upcoming window).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Loading the decrypted table failed.
    #[error(transparent)]
    Records(#[from] bfinder_records::RecordsError),
}
