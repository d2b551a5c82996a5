//! Integration tests for the bfinder-records crate.
//!
//! These exercise the full encrypt → load → decrypt lifecycle on real files:
//! the paired encryption tool, schema validation before decryption, and the
//! tamper guarantees of the cell cipher.

use std::io::Write;
use std::path::{Path, PathBuf};

use bfinder_records::cipher::{CellCipher, generate_key};
use bfinder_records::dataset::{self, HEADER};
use bfinder_records::{RecordStore, RecordsError, StoreConfig};

const ROWS: &[&str] = &[
    "ananya sharma,2001-05-14 00:00:00,A,9876543210.0,042,2021000042,Female,Hosteller,ananya@example.com",
    "rahul verma,2000-11-02 00:00:00,B,9123456780.0,007,2020000007,Male,Day Scholar,rahul@example.com",
    "priya nair,1999-02-28 00:00:00,A,9988776655.0,108,2019000108,Female,Hosteller,priya@example.com",
];

fn write_plaintext(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("data-main.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{}", HEADER.join(",")).unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    path
}

// ═══════════════════════════════════════════════════════════════════════
//  Round-trip
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn encrypt_then_load_reproduces_cells() {
    let dir = tempfile::tempdir().unwrap();
    let key = generate_key().unwrap();
    let cipher = CellCipher::new(&key).unwrap();

    let plain = write_plaintext(dir.path(), ROWS);
    let encrypted = dir.path().join("data-encrypted.csv");
    let count = dataset::encrypt_dataset(&cipher, &plain, &encrypted).unwrap();
    assert_eq!(count, 3);

    // Every on-disk data cell must differ from its plaintext.
    let encrypted_rows = dataset::read_rows(&encrypted).unwrap();
    let plain_rows = dataset::read_rows(&plain).unwrap();
    for (enc, plain) in encrypted_rows.iter().zip(plain_rows.iter()) {
        for (e, p) in enc.iter().zip(plain.iter()) {
            assert_ne!(e, p);
        }
    }

    // And cell-for-cell decryption must reproduce the originals.
    for (enc, plain) in encrypted_rows.iter().zip(plain_rows.iter()) {
        for (e, p) in enc.iter().zip(plain.iter()) {
            assert_eq!(&cipher.decrypt_cell(e).unwrap(), p);
        }
    }

    let store = RecordStore::new(StoreConfig {
        data_path: encrypted,
        key,
    });
    let table = store.get_table().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.records()[0].name, "Ananya Sharma");
    assert_eq!(table.records()[2].roll_no, "108");
}

// ═══════════════════════════════════════════════════════════════════════
//  Failure modes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn corrupted_cell_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    let key = generate_key().unwrap();
    let cipher = CellCipher::new(&key).unwrap();

    let plain = write_plaintext(dir.path(), ROWS);
    let encrypted = dir.path().join("data-encrypted.csv");
    dataset::encrypt_dataset(&cipher, &plain, &encrypted).unwrap();

    // Corrupt one cell in the middle of the file.
    let mut rows = dataset::read_rows(&encrypted).unwrap();
    rows[1][3] = {
        let mut cell = rows[1][3].clone();
        cell.truncate(cell.len() / 2);
        cell
    };
    dataset::write_rows(&encrypted, &rows).unwrap();

    let store = RecordStore::new(StoreConfig {
        data_path: encrypted,
        key,
    });
    assert!(matches!(
        store.get_table(),
        Err(RecordsError::Decryption { .. })
    ));
}

#[test]
fn schema_mismatch_detected_before_decryption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad-header.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "Name,Birthday,Section").unwrap();
    writeln!(file, "x,y,z").unwrap();

    let store = RecordStore::new(StoreConfig {
        data_path: path,
        key: generate_key().unwrap(),
    });
    assert!(matches!(
        store.get_table(),
        Err(RecordsError::DataSource { .. })
    ));
}

#[test]
fn ragged_row_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let key = generate_key().unwrap();
    let cipher = CellCipher::new(&key).unwrap();

    let plain = write_plaintext(dir.path(), ROWS);
    let encrypted = dir.path().join("data-encrypted.csv");
    dataset::encrypt_dataset(&cipher, &plain, &encrypted).unwrap();

    let mut rows = dataset::read_rows(&encrypted).unwrap();
    rows[0].pop();
    dataset::write_rows(&encrypted, &rows).unwrap();

    // write_rows emits what it is given; the reader must reject the row.
    let store = RecordStore::new(StoreConfig {
        data_path: encrypted,
        key,
    });
    assert!(matches!(
        store.get_table(),
        Err(RecordsError::DataSource { .. })
    ));
}
