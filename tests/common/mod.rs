// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDateTime;
use saldo::LedgerEngine;
use tempfile::TempDir;

/// Helper to create an engine over a fresh ledger file in a temporary directory
pub fn test_engine() -> Result<(LedgerEngine, TempDir)> {
    let temp_dir = TempDir::new()?;
    let engine = LedgerEngine::open(ledger_path(&temp_dir))?;
    Ok((engine, temp_dir))
}

pub fn ledger_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data.csv")
}

/// Helper to build a timestamp from "YYYY-MM-DD HH:MM:SS"
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Test fixture: the three entries used by most position tests
pub fn seed_three(engine: &mut LedgerEngine) -> Result<()> {
    engine.create_at("Gaji", "Pemasukan", "5000000", at("2024-01-01 10:00:00"))?;
    engine.create_at("Belanja", "Pengeluaran", "150000", at("2024-01-02 09:30:00"))?;
    engine.create_at("Listrik", "Pengeluaran", "350000", at("2024-01-03 08:15:00"))?;
    Ok(())
}
