//! SQLite-backed authorization store.
//!
//! Two small tables back the dashboard's access control:
//!
//! - `authorized_emails` — the allowlist of users permitted to sign in.
//! - `email_schedule` — per-user opt-in flag for the daily birthday email.
//!
//! A user with no `email_schedule` row is treated as opted out; the daily
//! job only ever sees explicitly enabled users.  Schema setup is automatic
//! on open.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::error::{AuthError, Result};

/// Authorization allowlist and schedule flags over one SQLite connection.
pub struct AuthStore {
    conn: Connection,
}

impl AuthStore {
    /// Open (or create) the store at `path` and run schema setup.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Database`] if the database cannot be opened and
    /// [`AuthError::Migration`] if schema setup fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening auth database");

        let conn = Connection::open(path)?;
        Self::configure_connection(&conn)?;

        let store = Self { conn };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;

        let store = Self { conn };
        store.run_migrations()?;
        Ok(store)
    }

    /// Configure SQLite pragmas for performance and safety.
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )?;
        Ok(())
    }

    /// Create the schema if it does not exist.
    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS authorized_emails (
                    email TEXT PRIMARY KEY
                );

                CREATE TABLE IF NOT EXISTS email_schedule (
                    email              TEXT PRIMARY KEY,
                    scheduling_enabled INTEGER NOT NULL DEFAULT 0
                );",
            )
            .map_err(|e| AuthError::Migration {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn validate_email(email: &str) -> Result<&str> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidArgument(format!(
                "`{email}` is not an email address"
            )));
        }
        Ok(email)
    }

    // -- Allowlist ----------------------------------------------------------

    /// Whether `email` is on the allowlist.
    pub fn is_authorized(&self, email: &str) -> Result<bool> {
        let email = Self::validate_email(email)?;
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM authorized_emails WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Add `email` to the allowlist.  Idempotent.
    pub fn add(&self, email: &str) -> Result<()> {
        let email = Self::validate_email(email)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO authorized_emails (email) VALUES (?1)",
            params![email],
        )?;
        debug!(email, "authorized email added");
        Ok(())
    }

    /// Remove `email` from the allowlist and its schedule row.
    pub fn remove(&self, email: &str) -> Result<()> {
        let email = Self::validate_email(email)?;
        self.conn.execute(
            "DELETE FROM authorized_emails WHERE email = ?1",
            params![email],
        )?;
        self.conn.execute(
            "DELETE FROM email_schedule WHERE email = ?1",
            params![email],
        )?;
        debug!(email, "authorized email removed");
        Ok(())
    }

    /// All allowlisted emails, sorted.
    pub fn list_authorized(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT email FROM authorized_emails ORDER BY email")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut emails = Vec::new();
        for row in rows {
            emails.push(row?);
        }
        Ok(emails)
    }

    // -- Schedule flags -----------------------------------------------------

    /// Whether `email` has opted into the daily birthday email.  A missing
    /// row reads as disabled.
    pub fn schedule_enabled(&self, email: &str) -> Result<bool> {
        let email = Self::validate_email(email)?;
        let enabled: Option<bool> = self
            .conn
            .query_row(
                "SELECT scheduling_enabled FROM email_schedule WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(enabled.unwrap_or(false))
    }

    /// Set the daily-email opt-in flag for `email`.  Upserts the row.
    pub fn set_schedule_enabled(&self, email: &str, enabled: bool) -> Result<()> {
        let email = Self::validate_email(email)?;
        self.conn.execute(
            "INSERT INTO email_schedule (email, scheduling_enabled) VALUES (?1, ?2)
             ON CONFLICT(email) DO UPDATE SET scheduling_enabled = ?2",
            params![email, enabled],
        )?;
        debug!(email, enabled, "schedule flag updated");
        Ok(())
    }

    /// All emails with the daily email enabled, sorted.
    pub fn enabled_users(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT email FROM email_schedule WHERE scheduling_enabled = 1 ORDER BY email",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut emails = Vec::new();
        for row in rows {
            emails.push(row?);
        }
        Ok(emails)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let store = AuthStore::open_in_memory().unwrap();
        store.add("a@example.com").unwrap();
        store.add("a@example.com").unwrap();
        assert_eq!(store.list_authorized().unwrap(), vec!["a@example.com"]);
        assert!(store.is_authorized("a@example.com").unwrap());
    }

    #[test]
    fn remove_clears_schedule_row_too() {
        let store = AuthStore::open_in_memory().unwrap();
        store.add("a@example.com").unwrap();
        store.set_schedule_enabled("a@example.com", true).unwrap();

        store.remove("a@example.com").unwrap();
        assert!(!store.is_authorized("a@example.com").unwrap());
        assert!(!store.schedule_enabled("a@example.com").unwrap());
        assert!(store.enabled_users().unwrap().is_empty());
    }

    #[test]
    fn missing_schedule_row_defaults_disabled() {
        let store = AuthStore::open_in_memory().unwrap();
        store.add("a@example.com").unwrap();
        assert!(!store.schedule_enabled("a@example.com").unwrap());
    }

    #[test]
    fn schedule_flag_round_trips() {
        let store = AuthStore::open_in_memory().unwrap();
        store.set_schedule_enabled("a@example.com", true).unwrap();
        assert!(store.schedule_enabled("a@example.com").unwrap());

        store.set_schedule_enabled("a@example.com", false).unwrap();
        assert!(!store.schedule_enabled("a@example.com").unwrap());
    }

    #[test]
    fn enabled_users_lists_only_enabled() {
        let store = AuthStore::open_in_memory().unwrap();
        store.set_schedule_enabled("on@example.com", true).unwrap();
        store.set_schedule_enabled("off@example.com", false).unwrap();

        assert_eq!(store.enabled_users().unwrap(), vec!["on@example.com"]);
    }

    #[test]
    fn rejects_non_email_strings() {
        let store = AuthStore::open_in_memory().unwrap();
        assert!(matches!(
            store.add("not-an-email"),
            Err(AuthError::InvalidArgument(_))
        ));
        assert!(store.add("").is_err());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.db");

        {
            let store = AuthStore::open(&path).unwrap();
            store.add("a@example.com").unwrap();
            store.set_schedule_enabled("a@example.com", true).unwrap();
        }

        let store = AuthStore::open(&path).unwrap();
        assert!(store.is_authorized("a@example.com").unwrap());
        assert_eq!(store.enabled_users().unwrap(), vec!["a@example.com"]);
    }
}
