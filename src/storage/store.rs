use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Writer};
use thiserror::Error;
use tracing::debug;

use crate::domain::{Kind, Transaction};

use super::HEADER;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cannot access ledger file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed ledger file {} at line {line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

/// Flat-file persistence for the ledger: one header row, then one row per transaction.
/// The whole file is rewritten on every save; there is no locking, so only one
/// process may write to a given file at a time.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file holding only the header row, unless it already exists.
    /// Returns `true` when the file was created by this call.
    pub fn ensure_initialized(&self) -> Result<bool, StoreError> {
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut writer = Writer::from_writer(file);
        writer
            .write_record(HEADER)
            .map_err(|e| self.csv_error(e, 1))?;
        writer.flush().map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Created ledger file");
        Ok(true)
    }

    /// Read every transaction in file order. Any row without exactly four fields aborts
    /// the whole load.
    pub fn load_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut records = reader.records();

        // A zero-byte file has no header yet; treat it as an empty ledger.
        let header = match records.next() {
            Some(record) => record.map_err(|e| self.csv_error(e, 1))?,
            None => return Ok(Vec::new()),
        };
        if !header.iter().eq(HEADER.iter().copied()) {
            return Err(self.format_error(
                line_of(&header, 1),
                format!(
                    "expected header \"{}\", found \"{}\"",
                    HEADER.join(","),
                    header.iter().collect::<Vec<_>>().join(",")
                ),
            ));
        }

        let mut transactions = Vec::new();
        for (index, result) in records.enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let fallback_line = index as u64 + 2;
            let record = result.map_err(|e| self.csv_error(e, fallback_line))?;

            if record.len() != HEADER.len() {
                return Err(self.format_error(
                    line_of(&record, fallback_line),
                    format!(
                        "expected {} fields, found {}",
                        HEADER.len(),
                        record.len()
                    ),
                ));
            }

            transactions.push(Transaction {
                timestamp: record[0].to_string(),
                description: record[1].to_string(),
                kind: Kind::from(record[2].to_string()),
                amount: record[3].to_string(),
            });
        }

        debug!(
            path = %self.path.display(),
            count = transactions.len(),
            "Loaded transactions"
        );
        Ok(transactions)
    }

    /// Replace the file's content with the header followed by `transactions` in order.
    pub fn save_all(&self, transactions: &[Transaction]) -> Result<(), StoreError> {
        let mut writer = Writer::from_path(&self.path).map_err(|e| self.csv_error(e, 1))?;
        write_rows(&mut writer, transactions).map_err(|e| self.csv_error(e, 0))?;
        writer.flush().map_err(|e| self.io_error(e))?;

        debug!(
            path = %self.path.display(),
            count = transactions.len(),
            "Saved transactions"
        );
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn format_error(&self, line: u64, message: String) -> StoreError {
        StoreError::Format {
            path: self.path.clone(),
            line,
            message,
        }
    }

    fn csv_error(&self, err: csv::Error, fallback_line: u64) -> StoreError {
        let line = err
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => self.io_error(source),
            _ => self.format_error(line, message),
        }
    }
}

/// Write the header and one row per transaction. Shared with the CSV export so both
/// produce the same schema.
pub fn write_rows<W: Write>(
    writer: &mut Writer<W>,
    transactions: &[Transaction],
) -> csv::Result<()> {
    writer.write_record(HEADER)?;
    for tx in transactions {
        writer.write_record([
            tx.timestamp.as_str(),
            tx.description.as_str(),
            tx.kind.as_str(),
            tx.amount.as_str(),
        ])?;
    }
    Ok(())
}

fn line_of(record: &StringRecord, fallback: u64) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;

    fn temp_store() -> (LedgerStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("data.csv"));
        (store, dir)
    }

    fn make(day: u32, description: &str, kind: Kind, amount: &str) -> Transaction {
        let ts = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Transaction::new(ts, description, kind, amount)
    }

    #[test]
    fn test_ensure_initialized_writes_header_only() {
        let (store, _dir) = temp_store();
        assert!(!store.path().exists());

        assert!(store.ensure_initialized().unwrap());
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "Tanggal,Keterangan,Tipe,Jumlah\n");
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_ensure_initialized_never_overwrites() {
        let (store, _dir) = temp_store();
        store.ensure_initialized().unwrap();
        store
            .save_all(&[make(1, "Gaji", Kind::Income, "5000000")])
            .unwrap();

        assert!(!store.ensure_initialized().unwrap());
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_save_writes_fixed_layout() {
        let (store, _dir) = temp_store();
        store
            .save_all(&[
                make(1, "Gaji", Kind::Income, "5000000"),
                make(2, "Belanja", Kind::Expense, "150000"),
            ])
            .unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content,
            "Tanggal,Keterangan,Tipe,Jumlah\n\
             2024-01-01 10:00:00,Gaji,Pemasukan,5000000\n\
             2024-01-02 10:00:00,Belanja,Pengeluaran,150000\n"
        );
    }

    #[test]
    fn test_round_trip_preserves_order_and_text() {
        let (store, _dir) = temp_store();
        let transactions = vec![
            make(1, "Gaji, bulan Januari", Kind::Income, "5000000"),
            make(2, "Makan \"siang\"", Kind::Expense, "007"),
            make(3, "baris\nkedua", Kind::Other("Pinjaman".into()), "1"),
        ];

        store.save_all(&transactions).unwrap();
        assert_eq!(store.load_all().unwrap(), transactions);
    }

    #[test]
    fn test_load_reads_crlf_files() {
        let (store, _dir) = temp_store();
        fs::write(
            store.path(),
            "Tanggal,Keterangan,Tipe,Jumlah\r\n2024-01-01 10:00:00,Gaji,Pemasukan,5000000\r\n",
        )
        .unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![make(1, "Gaji", Kind::Income, "5000000")]);
    }

    #[test]
    fn test_load_empty_file() {
        let (store, _dir) = temp_store();
        fs::write(store.path(), "").unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_short_row() {
        let (store, _dir) = temp_store();
        fs::write(
            store.path(),
            "Tanggal,Keterangan,Tipe,Jumlah\n\
             2024-01-01 10:00:00,Gaji,Pemasukan,5000000\n\
             2024-01-02 10:00:00,Belanja,Pengeluaran\n",
        )
        .unwrap();

        match store.load_all() {
            Err(StoreError::Format { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_wrong_header() {
        let (store, _dir) = temp_store();
        fs::write(store.path(), "Date,Description,Type,Amount\n").unwrap();

        assert!(matches!(
            store.load_all(),
            Err(StoreError::Format { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let (store, _dir) = temp_store();
        assert!(matches!(store.load_all(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("missing").join("data.csv"));
        assert!(matches!(store.save_all(&[]), Err(StoreError::Io { .. })));
    }
}
