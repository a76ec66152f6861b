use serde::{Deserialize, Serialize};

use crate::domain::Rupiah;

/// Aggregate figures shown next to the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub income: Rupiah,
    pub expense: Rupiah,
    pub balance: Rupiah,
}
