use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use crate::domain::{Kind, Transaction, compute_balance, compute_totals, parse_amount};
use crate::storage::LedgerStore;

use super::{InvalidField, LedgerError, Summary};

/// Session over a ledger file. Holds the ordered list of transactions in memory and
/// rewrites the whole file after every successful mutation.
///
/// A transaction is addressed by its position in the list; deleting position `i`
/// shifts every later entry down by one.
pub struct LedgerEngine {
    store: LedgerStore,
    transactions: Vec<Transaction>,
    selected: Option<usize>,
}

/// User input that passed validation.
struct ValidFields {
    description: String,
    kind: Kind,
    amount: String,
}

impl LedgerEngine {
    /// Open the ledger at `path`, creating it with just the header if it is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        Self::from_store(LedgerStore::new(path))
    }

    pub fn from_store(store: LedgerStore) -> Result<Self, LedgerError> {
        if store.ensure_initialized()? {
            info!(path = %store.path().display(), "Initialized new ledger file");
        }
        let transactions = store.load_all()?;
        Ok(Self {
            store,
            transactions,
            selected: None,
        })
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Read-only view of every transaction in ledger order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, position: usize) -> Option<&Transaction> {
        self.transactions.get(position)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Income minus expenses over the whole ledger.
    pub fn balance(&self) -> i64 {
        compute_balance(&self.transactions)
    }

    pub fn summary(&self) -> Summary {
        let totals = compute_totals(&self.transactions);
        Summary {
            count: self.transactions.len(),
            income: totals.income,
            expense: totals.expense,
            balance: self.balance(),
        }
    }

    // ========================
    // Selection
    // ========================

    /// Mark `position` as the entry later edits and deletes apply to, returning it so
    /// a form can be filled with its current values.
    pub fn select(&mut self, position: usize) -> Result<&Transaction, LedgerError> {
        let position = self.check_position(Some(position))?;
        self.selected = Some(position);
        Ok(&self.transactions[position])
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn update_selected(
        &mut self,
        description: &str,
        kind_text: &str,
        amount_text: &str,
    ) -> Result<&Transaction, LedgerError> {
        self.update(self.selected, description, kind_text, amount_text)
    }

    pub fn delete_selected(&mut self) -> Result<Transaction, LedgerError> {
        self.delete(self.selected)
    }

    // ========================
    // Mutations
    // ========================

    /// Append a new transaction stamped with the current local time.
    pub fn create(
        &mut self,
        description: &str,
        kind_text: &str,
        amount_text: &str,
    ) -> Result<&Transaction, LedgerError> {
        let now = Local::now().naive_local();
        self.create_at(description, kind_text, amount_text, now)
    }

    pub fn create_at(
        &mut self,
        description: &str,
        kind_text: &str,
        amount_text: &str,
        timestamp: NaiveDateTime,
    ) -> Result<&Transaction, LedgerError> {
        let fields = validate(description, kind_text, amount_text)?;
        let tx = Transaction::new(timestamp, fields.description, fields.kind, fields.amount);

        self.transactions.push(tx);
        if let Err(e) = self.store.save_all(&self.transactions) {
            self.transactions.pop();
            return Err(e.into());
        }
        self.selected = None;

        let position = self.transactions.len() - 1;
        let tx = &self.transactions[position];
        info!(position, kind = %tx.kind, amount = %tx.amount, "Created transaction");
        Ok(tx)
    }

    /// Replace description, kind and amount of the entry at `position`. The timestamp
    /// and the entry's place in the ledger are kept.
    pub fn update(
        &mut self,
        position: Option<usize>,
        description: &str,
        kind_text: &str,
        amount_text: &str,
    ) -> Result<&Transaction, LedgerError> {
        let position = self.check_position(position)?;
        let fields = validate(description, kind_text, amount_text)?;

        let tx = &mut self.transactions[position];
        let previous = tx.clone();
        tx.description = fields.description;
        tx.kind = fields.kind;
        tx.amount = fields.amount;

        if let Err(e) = self.store.save_all(&self.transactions) {
            self.transactions[position] = previous;
            return Err(e.into());
        }
        self.selected = None;

        let tx = &self.transactions[position];
        info!(position, kind = %tx.kind, amount = %tx.amount, "Updated transaction");
        Ok(tx)
    }

    /// Remove the entry at `position`, returning it.
    pub fn delete(&mut self, position: Option<usize>) -> Result<Transaction, LedgerError> {
        let position = self.check_position(position)?;

        let removed = self.transactions.remove(position);
        if let Err(e) = self.store.save_all(&self.transactions) {
            self.transactions.insert(position, removed);
            return Err(e.into());
        }
        self.selected = None;

        info!(position, remaining = self.transactions.len(), "Deleted transaction");
        Ok(removed)
    }

    /// Re-read the file, discarding the in-memory list and the selection.
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        self.transactions = self.store.load_all()?;
        self.selected = None;
        debug!(count = self.transactions.len(), "Reloaded ledger");
        Ok(())
    }

    fn check_position(&self, position: Option<usize>) -> Result<usize, LedgerError> {
        match position {
            Some(p) if p < self.transactions.len() => Ok(p),
            _ => Err(LedgerError::Range {
                position,
                len: self.transactions.len(),
            }),
        }
    }
}

/// Check all three inputs, reporting every field that fails rather than the first.
fn validate(
    description: &str,
    kind_text: &str,
    amount_text: &str,
) -> Result<ValidFields, LedgerError> {
    let mut invalid = Vec::new();

    if description.trim().is_empty() {
        invalid.push(InvalidField::EmptyDescription);
    }

    let kind = Kind::from_literal(kind_text);
    if kind.is_none() {
        invalid.push(InvalidField::UnknownKind(kind_text.to_string()));
    }

    if let Err(reason) = parse_amount(amount_text) {
        invalid.push(InvalidField::Amount {
            input: amount_text.to_string(),
            reason,
        });
    }

    match kind {
        Some(kind) if invalid.is_empty() => Ok(ValidFields {
            description: description.to_string(),
            kind,
            amount: amount_text.to_string(),
        }),
        _ => Err(LedgerError::Validation(invalid)),
    }
}
