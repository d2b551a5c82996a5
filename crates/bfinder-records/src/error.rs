//! Record store error types.
//!
//! All record-store operations surface errors through [`RecordsError`], the
//! single error type returned by every public API in this crate.  The two
//! load-time failure classes the rest of the system cares about are
//! [`RecordsError::DataSource`] (file or schema problems) and
//! [`RecordsError::Decryption`] (authentication failure on any cell) — both
//! abort the table load entirely so bad data is never partially exposed.

/// Unified error type for the Birthday Finder record store.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// The dataset file is missing, unreadable, or its schema does not match
    /// the fixed column set (wrong header names, wrong cell count, bad DOB).
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    /// Authenticated decryption of a cell failed (wrong key, corrupted or
    /// truncated ciphertext, bad token encoding).
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },

    /// Encryption of a cell failed (e.g. ring internal error).
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },

    /// The symmetric key is malformed (wrong length or bad base64).
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    /// I/O error while writing an encrypted dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for unexpected internal errors (poisoned lock, CSPRNG
    /// failure).  Prefer a typed variant whenever possible.
    #[error("internal record store error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the records crate.
pub type Result<T> = std::result::Result<T, RecordsError>;
