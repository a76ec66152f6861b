use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{LedgerEngine, Summary};
use crate::domain::Transaction;
use crate::storage::write_rows;

/// Point-in-time copy of the ledger for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
}

/// Exporter for writing ledger data to other formats
pub struct Exporter<'a> {
    engine: &'a LedgerEngine,
}

impl<'a> Exporter<'a> {
    pub fn new(engine: &'a LedgerEngine) -> Self {
        Self { engine }
    }

    /// Export transactions as CSV in the same layout as the ledger file
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let transactions = self.engine.transactions();
        let mut csv_writer = csv::Writer::from_writer(writer);

        write_rows(&mut csv_writer, transactions)?;
        csv_writer.flush()?;

        Ok(transactions.len())
    }

    /// Export the full ledger plus its summary as a JSON snapshot
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            transactions: self.engine.transactions().to_vec(),
            summary: self.engine.summary(),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(snapshot)
    }
}
