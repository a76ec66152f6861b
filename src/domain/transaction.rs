use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the timestamp column, e.g. `2024-01-01 10:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Literal stored in the kind column for income entries.
pub const INCOME_LITERAL: &str = "Pemasukan";

/// Literal stored in the kind column for expense entries.
pub const EXPENSE_LITERAL: &str = "Pengeluaran";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    /// Money coming in; adds to the balance.
    Income,
    /// Money going out; subtracts from the balance.
    Expense,
    /// A literal this program never writes but found in the file.
    /// Kept verbatim so it survives a rewrite; counts as zero.
    Other(String),
}

impl Kind {
    pub fn as_str(&self) -> &str {
        match self {
            Kind::Income => INCOME_LITERAL,
            Kind::Expense => EXPENSE_LITERAL,
            Kind::Other(literal) => literal,
        }
    }

    /// Strict parse used for user input: only the two recognized literals.
    pub fn from_literal(s: &str) -> Option<Self> {
        match s {
            INCOME_LITERAL => Some(Kind::Income),
            EXPENSE_LITERAL => Some(Kind::Expense),
            _ => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Kind::Other(_))
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Kind::from_literal(&s).unwrap_or(Kind::Other(s))
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Other(literal) => literal,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One ledger entry. Every field is kept as the text found in (or written to) the
/// file so a load/save cycle reproduces the rows exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: String,
    pub description: String,
    pub kind: Kind,
    pub amount: String,
}

impl Transaction {
    pub fn new(
        timestamp: NaiveDateTime,
        description: impl Into<String>,
        kind: Kind,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            description: description.into(),
            kind,
            amount: amount.into(),
        }
    }

    /// Amount as a number, or `None` when the stored text is not a valid amount.
    pub fn amount_value(&self) -> Option<i64> {
        super::parse_amount(&self.amount).ok()
    }

    /// Signed contribution of this entry to the balance.
    pub fn signed_amount(&self) -> Option<i64> {
        match self.kind {
            Kind::Income => self.amount_value(),
            Kind::Expense => self.amount_value().map(|a| -a),
            Kind::Other(_) => Some(0),
        }
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }
}
