//! Authorization store for Birthday Finder.
//!
//! The dashboard authenticates users through third-party single sign-on and
//! then checks them against the allowlist kept here.  This crate also owns
//! the per-user opt-in flag the daily email job consults.  The query engine
//! never touches this store; only the surrounding application and the
//! scheduled job do.

pub mod error;
pub mod store;

pub use error::{AuthError, Result};
pub use store::AuthStore;
