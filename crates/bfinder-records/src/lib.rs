//! Record store for Birthday Finder.
//!
//! This crate owns the encrypted dataset: a flat CSV table with a fixed
//! schema where every cell is an AES-256-GCM token.  It decrypts the file
//! into an immutable in-memory table exactly once per store and hands out a
//! shared reference to every caller.
//!
//! # Modules
//!
//! - [`cipher`] — per-cell AES-256-GCM sealing/opening and key helpers.
//! - [`dataset`] — fixed-schema CSV reading/writing and the paired
//!   `encrypt_dataset` tool.
//! - [`record`] — typed [`PersonRecord`]s and the [`DecryptedTable`].
//! - [`store`] — the decrypt-once [`RecordStore`] cache.
//! - [`error`] — unified error types.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use bfinder_records::{RecordStore, StoreConfig};
//!
//! # fn example() -> bfinder_records::Result<()> {
//! let store = RecordStore::new(StoreConfig::from_env()?);
//! let table = store.get_table()?;
//! for person in table.records() {
//!     println!("{} — {}", person.name, person.dob.date());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod dataset;
pub mod error;
pub mod record;
pub mod store;

// Re-export the most commonly used types at the crate root.
pub use error::{RecordsError, Result};
pub use record::{DecryptedTable, PersonRecord};
pub use store::{RecordStore, StoreConfig};
