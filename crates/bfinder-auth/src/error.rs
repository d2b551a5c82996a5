//! Error types for the bfinder-auth crate.

use thiserror::Error;

/// Alias for `Result<T, AuthError>`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur in the authorization store.
#[derive(Debug, Error)]
pub enum AuthError {
    /// SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Schema setup failed.
    #[error("migration failed: {reason}")]
    Migration { reason: String },

    /// An invalid argument was provided (e.g. an empty email).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
