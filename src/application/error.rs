use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ParseAmountError;
use crate::storage::StoreError;

/// A single field rejected by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidField {
    EmptyDescription,
    Amount {
        input: String,
        reason: ParseAmountError,
    },
    UnknownKind(String),
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidField::EmptyDescription => write!(f, "description must not be empty"),
            InvalidField::Amount { input, reason } => {
                write!(f, "invalid amount '{}': {}", input, reason)
            }
            InvalidField::UnknownKind(kind) => write!(
                f,
                "unknown kind '{}' (expected {} or {})",
                kind,
                crate::domain::INCOME_LITERAL,
                crate::domain::EXPENSE_LITERAL
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {}", join_fields(.0))]
    Validation(Vec<InvalidField>),

    #[error("{}", describe_range(.position, .len))]
    Range { position: Option<usize>, len: usize },

    #[error("Cannot access ledger file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ledger file {} at line {line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, LedgerError::Range { .. })
    }

    /// Fields named by a validation failure; empty for other errors.
    pub fn invalid_fields(&self) -> &[InvalidField] {
        match self {
            LedgerError::Validation(fields) => fields,
            _ => &[],
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { path, source } => LedgerError::Io { path, source },
            StoreError::Format {
                path,
                line,
                message,
            } => LedgerError::Format {
                path,
                line,
                message,
            },
        }
    }
}

fn join_fields(fields: &[InvalidField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn describe_range(position: &Option<usize>, len: &usize) -> String {
    match position {
        None => "No transaction selected".to_string(),
        Some(p) => format!(
            "No transaction at position {} (ledger has {} entries)",
            p, len
        ),
    }
}
