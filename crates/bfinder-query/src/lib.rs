//! Birthday query engine for Birthday Finder.
//!
//! Computes three derived views over the decrypted record table: birthdays
//! today, birthdays on the next *n* distinct future days, and birthdays
//! missed yesterday.  All date arithmetic is anchored to Asia/Kolkata
//! through the [`Clock`] abstraction, so tests can pin "today" to a literal
//! date.
//!
//! # Modules
//!
//! - [`clock`] — the [`Clock`] trait, system and fixed implementations.
//! - [`view`] — per-view typed row types with display column names.
//! - [`engine`] — the [`QueryEngine`] and its pure view functions.
//! - [`error`] — unified error types.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bfinder_records::{RecordStore, StoreConfig};
//! use bfinder_query::{QueryEngine, SystemClock};
//!
//! # fn example() -> bfinder_query::Result<()> {
//! let store = Arc::new(RecordStore::new(StoreConfig::from_env()?));
//! let engine = QueryEngine::new(store);
//!
//! for row in engine.today(&SystemClock)? {
//!     println!("{} turns {} today", row.name, row.age);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod view;

// Re-export the most commonly used types at the crate root.
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::QueryEngine;
pub use error::{QueryError, Result};
pub use view::{MissedRow, TodayRow, UpcomingRow};
