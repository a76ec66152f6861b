// Application layer: the ledger engine and the errors it reports.
// Clients (the CLI, or any other front end) go through `LedgerEngine` and never touch
// the store directly.

mod engine;
pub mod error;
mod reporting;

pub use engine::*;
pub use error::*;
pub use reporting::*;
