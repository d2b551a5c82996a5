//! Error types for the bfinder-notify crate.

use thiserror::Error;

/// Alias for `Result<T, NotifyError>`.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors that can occur while rendering, sending, or scheduling the daily
/// email.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP conversation failed (connect, auth, or a rejected command).
    #[error("smtp error: {reason}")]
    Smtp { reason: String },

    /// A network operation exceeded its deadline.
    #[error("timed out after {seconds}s: {reason}")]
    Timeout { seconds: u64, reason: String },

    /// Configuration is missing or malformed (bad send time, bad port).
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The cron schedule could not be built or yielded no fire times.
    #[error("schedule error: {reason}")]
    Schedule { reason: String },

    /// Computing the birthday view failed.
    #[error(transparent)]
    Query(#[from] bfinder_query::QueryError),

    /// Reading opted-in users failed.
    #[error(transparent)]
    Auth(#[from] bfinder_auth::AuthError),

    /// I/O error on the TLS stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
