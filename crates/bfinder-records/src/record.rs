//! Typed person records and the decrypted table.
//!
//! A [`PersonRecord`] is the decrypted, validated projection of one dataset
//! row.  All parsing and display normalization happens here, at load time,
//! rather than on each access: name title-casing, the contact-number suffix
//! strip, and DOB parsing into a real calendar type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dataset::COLUMN_COUNT;
use crate::error::{RecordsError, Result};

/// Format of the DOB column in the source data.
pub const DOB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One decrypted, typed dataset row.  Immutable after construction; the
/// table is never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Person's name, canonicalized to title case.
    pub name: String,
    /// Date of birth.  Stored with full precision; only year/month/day are
    /// semantically used.
    pub dob: NaiveDateTime,
    /// Class section.
    pub section: String,
    /// Contact number with the trailing two characters stripped — the source
    /// data carries a float-formatting artifact (`...0.0`) and downstream
    /// consumers expect the stripped form.
    pub contact: String,
    /// Roll number, kept as a string so zero-padding survives.
    pub roll_no: String,
    /// Registration number, kept as a string so zero-padding survives.
    pub registration_no: String,
    /// Gender, free-form as in the source data.
    pub gender: String,
    /// Hosteller or day scholar.
    pub residency: String,
    /// Email address.
    pub email: String,
}

impl PersonRecord {
    /// Build a record from the decrypted cells of one row, in schema order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::DataSource`] on a wrong cell count or an
    /// unparseable DOB.  Error messages carry no decrypted cell values.
    pub fn from_cells(cells: &[String]) -> Result<Self> {
        if cells.len() != COLUMN_COUNT {
            return Err(RecordsError::DataSource {
                reason: format!("row has {} cells, expected {}", cells.len(), COLUMN_COUNT),
            });
        }

        let dob = NaiveDateTime::parse_from_str(cells[1].trim(), DOB_FORMAT).map_err(|_| {
            RecordsError::DataSource {
                reason: format!("DOB cell does not match `{DOB_FORMAT}`"),
            }
        })?;

        Ok(Self {
            name: title_case(&cells[0]),
            dob,
            section: cells[2].clone(),
            contact: strip_contact(&cells[3]),
            roll_no: cells[4].clone(),
            registration_no: cells[5].clone(),
            gender: cells[6].clone(),
            residency: cells[7].clone(),
            email: cells[8].clone(),
        })
    }
}

/// The full ordered, immutable decrypted dataset.
///
/// Built at most once per [`crate::store::RecordStore`] and shared behind an
/// `Arc`; queries derive fresh output instead of mutating rows.
#[derive(Debug)]
pub struct DecryptedTable {
    records: Vec<PersonRecord>,
}

impl DecryptedTable {
    pub(crate) fn new(records: Vec<PersonRecord>) -> Self {
        Self { records }
    }

    /// All records in source-file order.
    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Field normalization (pure functions, testable)
// ---------------------------------------------------------------------------

/// Canonicalize a name to title case: the first letter of every word is
/// uppercased, the rest lowercased.  A word starts after any non-alphabetic
/// character.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Drop the trailing two characters of a contact-number string.
///
/// The source dataset stores contact numbers through a numeric conversion
/// that leaves a `.0` suffix; downstream output has always shown the
/// stripped form, so the behavior is preserved exactly (strings of two or
/// fewer characters become empty).
pub fn strip_contact(s: &str) -> String {
    let trimmed = s.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 2 {
        return String::new();
    }
    chars[..chars.len() - 2].iter().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
