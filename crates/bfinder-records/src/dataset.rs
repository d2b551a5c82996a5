//! Fixed-schema CSV dataset I/O.
//!
//! The dataset is one flat table with an exact, ordered column set (see
//! [`HEADER`]).  On disk every cell of every data row is an encrypted token
//! produced by [`crate::cipher::CellCipher`]; the header row stays in the
//! clear so schema validation can happen before any decryption.
//!
//! Line splitting and formatting are small pure functions.  Encrypted tokens
//! are base64 and can never contain delimiters, but the plaintext side of
//! [`encrypt_dataset`] accepts ordinary double-quoted fields.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::cipher::CellCipher;
use crate::error::{RecordsError, Result};

/// The fixed column set, in order.  Any other header is a schema mismatch.
pub const HEADER: [&str; 9] = [
    "Name",
    "DOB",
    "Section",
    "Contact No.",
    "Roll No",
    "Registration No",
    "Gender",
    "Hosteller Or Day Scholar",
    "Email ID",
];

/// Number of columns in the fixed schema.
pub const COLUMN_COUNT: usize = HEADER.len();

// ---------------------------------------------------------------------------
// Line parsing (pure functions, testable)
// ---------------------------------------------------------------------------

/// Split one CSV line into cells, honoring double-quoted fields with `""`
/// escapes.
pub fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

/// Join cells into one CSV line, quoting any cell that needs it.
pub fn format_line(cells: &[String]) -> String {
    let formatted: Vec<String> = cells
        .iter()
        .map(|cell| {
            if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect();
    formatted.join(",")
}

/// Validate that `cells` is exactly the fixed header.
pub fn validate_header(cells: &[String]) -> Result<()> {
    if cells.len() != COLUMN_COUNT {
        return Err(RecordsError::DataSource {
            reason: format!(
                "expected {} columns, found {}",
                COLUMN_COUNT,
                cells.len()
            ),
        });
    }
    for (found, expected) in cells.iter().zip(HEADER.iter()) {
        if found != expected {
            return Err(RecordsError::DataSource {
                reason: format!("unexpected column `{found}`, expected `{expected}`"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Dataset I/O
// ---------------------------------------------------------------------------

/// Read a dataset file and return its data rows as raw cell strings.
///
/// The header row is validated against [`HEADER`] and not returned.  Blank
/// trailing lines are ignored; a data row with the wrong cell count is a
/// schema mismatch.
///
/// # Errors
///
/// Returns [`RecordsError::DataSource`] if the file cannot be read, the
/// header does not match, or any row has the wrong number of cells.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = fs::read_to_string(path).map_err(|e| RecordsError::DataSource {
        reason: format!("cannot read {}: {e}", path.display()),
    })?;

    let mut lines = content.lines();
    let header_line = lines.next().ok_or_else(|| RecordsError::DataSource {
        reason: format!("{} is empty", path.display()),
    })?;
    validate_header(&split_line(header_line))?;

    let mut rows = Vec::new();
    for (number, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_line(line);
        if cells.len() != COLUMN_COUNT {
            return Err(RecordsError::DataSource {
                reason: format!(
                    "row {} has {} cells, expected {}",
                    number + 2,
                    cells.len(),
                    COLUMN_COUNT
                ),
            });
        }
        rows.push(cells);
    }

    Ok(rows)
}

/// Write a dataset file: the clear header followed by `rows`.
pub fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut file = fs::File::create(path)?;
    let header: Vec<String> = HEADER.iter().map(|c| c.to_string()).collect();
    writeln!(file, "{}", format_line(&header))?;
    for row in rows {
        writeln!(file, "{}", format_line(row))?;
    }
    Ok(())
}

/// Encrypt a plaintext dataset cell-for-cell into a new file.
///
/// This is the paired tool for the record store: decrypting its output with
/// the same key reproduces the input cells exactly.  Returns the number of
/// data rows written.
pub fn encrypt_dataset(cipher: &CellCipher, input: &Path, output: &Path) -> Result<usize> {
    let rows = read_rows(input)?;

    let mut encrypted = Vec::with_capacity(rows.len());
    for row in &rows {
        let cells: Result<Vec<String>> = row.iter().map(|c| cipher.encrypt_cell(c)).collect();
        encrypted.push(cells?);
    }

    write_rows(output, &encrypted)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = encrypted.len(),
        "encrypted dataset written"
    );
    Ok(encrypted.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
