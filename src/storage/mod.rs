mod store;

pub use store::*;

/// Column names of the ledger file, in column order. Existing data files depend on
/// this exact spelling.
pub const HEADER: [&str; 4] = ["Tanggal", "Keterangan", "Tipe", "Jumlah"];
