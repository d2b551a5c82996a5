//! Daily birthday email for Birthday Finder.
//!
//! Renders the "today" birthday view into an HTML notification, delivers it
//! over SMTP with implicit TLS, and drives the whole thing from a once-a-day
//! cron schedule anchored to Asia/Kolkata.
//!
//! # Modules
//!
//! - [`render`] — HTML table/document rendering and the templated message.
//! - [`smtp`] — SMTP command builders, TLS transport, the [`EmailSender`]
//!   trait.
//! - [`job`] — the [`DailyEmailJob`] runner and cron loop.
//! - [`error`] — unified error types.

pub mod error;
pub mod job;
pub mod render;
pub mod smtp;

pub use error::{NotifyError, Result};
pub use job::{DailyEmailJob, JobReport};
pub use smtp::{EmailSender, Mailer, SmtpConfig};
