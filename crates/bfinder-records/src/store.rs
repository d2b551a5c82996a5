//! Decrypt-once record store.
//!
//! [`RecordStore`] owns the encrypted dataset file and the symmetric key,
//! and exposes the decrypted table through [`RecordStore::get_table`].  The
//! first caller performs the load (read, decrypt every cell, parse into
//! typed records); the result is cached for the life of the store and every
//! later caller gets the same shared `Arc`.  The cache mutex is held across
//! the load, so concurrent first callers block instead of decrypting twice.
//!
//! There is deliberately no global instance and no invalidation API: tests
//! construct a fresh store per run, and production restarts the process to
//! pick up a new dataset.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::cipher::{self, CellCipher};
use crate::dataset;
use crate::error::{RecordsError, Result};
use crate::record::{DecryptedTable, PersonRecord};

/// Environment variable holding the base64-encoded 256-bit key.
pub const KEY_ENV: &str = "BFINDER_KEY";

/// Environment variable holding the encrypted dataset path.
pub const DATA_ENV: &str = "BFINDER_DATA";

/// Configuration for a [`RecordStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the encrypted CSV dataset.
    pub data_path: PathBuf,
    /// The 256-bit symmetric key protecting every cell.
    pub key: [u8; cipher::KEY_LEN],
}

impl StoreConfig {
    /// Read configuration from the environment (`BFINDER_KEY`,
    /// `BFINDER_DATA`).
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::InvalidKey`] on a missing or malformed key and
    /// [`RecordsError::DataSource`] on a missing data path.
    pub fn from_env() -> Result<Self> {
        let encoded = std::env::var(KEY_ENV).map_err(|_| RecordsError::InvalidKey {
            reason: format!("{KEY_ENV} is not set"),
        })?;
        let key = cipher::decode_key(&encoded)?;

        let data_path = std::env::var(DATA_ENV).map_err(|_| RecordsError::DataSource {
            reason: format!("{DATA_ENV} is not set"),
        })?;

        Ok(Self {
            data_path: PathBuf::from(data_path),
            key,
        })
    }
}

/// Lazily-initialized, mutex-guarded holder of the decrypted table.
pub struct RecordStore {
    config: StoreConfig,
    cache: Mutex<Option<Arc<DecryptedTable>>>,
}

impl RecordStore {
    /// Create a store.  No file access or decryption happens until the first
    /// [`get_table`](Self::get_table) call.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cache: Mutex::new(None),
        }
    }

    /// Return the decrypted table, loading it on first use.
    ///
    /// Exactly-once semantics: while one caller is loading, concurrent
    /// callers block on the cache mutex and then observe the cached table.
    /// A failed load caches nothing, so no partially-decrypted data is ever
    /// exposed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::DataSource`] for file or schema problems and
    /// [`RecordsError::Decryption`] if any cell fails authenticated
    /// decryption.
    pub fn get_table(&self) -> Result<Arc<DecryptedTable>> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|e| RecordsError::Internal(format!("cache mutex poisoned: {e}")))?;

        if let Some(table) = cache.as_ref() {
            debug!(rows = table.len(), "record table served from cache");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.load()?);
        *cache = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Read, decrypt, and parse the dataset.
    fn load(&self) -> Result<DecryptedTable> {
        info!(path = %self.config.data_path.display(), "loading encrypted dataset");

        let cipher = CellCipher::new(&self.config.key)?;
        let rows = dataset::read_rows(&self.config.data_path)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let cells: Result<Vec<String>> =
                row.iter().map(|cell| cipher.decrypt_cell(cell)).collect();
            records.push(PersonRecord::from_cells(&cells?)?);
        }

        info!(rows = records.len(), "dataset decrypted");
        Ok(DecryptedTable::new(records))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
