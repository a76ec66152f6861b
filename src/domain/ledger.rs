use tracing::warn;

use super::{Kind, Rupiah, Transaction};

/// Compute the balance of a list of transactions.
/// Balance = sum of income amounts - sum of expense amounts.
/// Entries with an unrecognized kind, or an amount that does not parse, count as zero.
pub fn compute_balance(transactions: &[Transaction]) -> Rupiah {
    transactions
        .iter()
        .enumerate()
        .fold(0, |balance: Rupiah, (position, tx)| {
            if !tx.kind.is_recognized() {
                warn!(position, kind = %tx.kind, "Unrecognized kind counts as zero");
            }
            match tx.signed_amount() {
                Some(amount) => balance.saturating_add(amount),
                None => {
                    warn!(position, amount = %tx.amount, "Skipping unparseable amount");
                    balance
                }
            }
        })
}

/// Income and expense sums, kept apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Rupiah,
    pub expense: Rupiah,
}

impl Totals {
    pub fn net(&self) -> Rupiah {
        self.income.saturating_sub(self.expense)
    }
}

pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();

    for tx in transactions {
        let Some(amount) = tx.amount_value() else {
            continue;
        };
        match tx.kind {
            Kind::Income => totals.income = totals.income.saturating_add(amount),
            Kind::Expense => totals.expense = totals.expense.saturating_add(amount),
            Kind::Other(_) => {}
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use super::*;

    fn make(kind: Kind, amount: &str) -> Transaction {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Transaction::new(ts, "entry", kind, amount)
    }

    #[test]
    fn test_compute_balance_empty() {
        assert_eq!(compute_balance(&[]), 0);
    }

    #[test]
    fn test_compute_balance_mixed() {
        let transactions = vec![
            make(Kind::Income, "5000000"),
            make(Kind::Expense, "150000"),
        ];
        assert_eq!(compute_balance(&transactions), 4850000);
    }

    #[test]
    fn test_compute_balance_can_go_negative() {
        let transactions = vec![make(Kind::Income, "100"), make(Kind::Expense, "250")];
        assert_eq!(compute_balance(&transactions), -150);
    }

    #[test]
    fn test_unrecognized_kind_counts_as_zero() {
        let transactions = vec![
            make(Kind::Income, "1000"),
            make(Kind::Other("Hutang".into()), "500"),
        ];
        assert_eq!(compute_balance(&transactions), 1000);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn balance_with_logs(transactions: &[Transaction]) -> (Rupiah, String) {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();

        let balance =
            tracing::subscriber::with_default(subscriber, || compute_balance(transactions));
        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        (balance, logs)
    }

    #[test]
    fn test_unrecognized_kind_is_logged() {
        let transactions = vec![
            make(Kind::Income, "1000"),
            make(Kind::Other("Hutang".into()), "500"),
        ];

        let (balance, logs) = balance_with_logs(&transactions);
        assert_eq!(balance, 1000);
        assert!(logs.contains("Unrecognized kind counts as zero"));
        assert!(logs.contains("Hutang"));
    }

    #[test]
    fn test_recognized_kinds_log_nothing() {
        let transactions = vec![make(Kind::Income, "1000"), make(Kind::Expense, "10")];

        let (balance, logs) = balance_with_logs(&transactions);
        assert_eq!(balance, 990);
        assert!(logs.is_empty());
    }

    #[test]
    fn test_unparseable_amount_counts_as_zero() {
        let transactions = vec![make(Kind::Income, "1000"), make(Kind::Expense, "x")];
        assert_eq!(compute_balance(&transactions), 1000);
    }

    #[test]
    fn test_balance_matches_totals() {
        let transactions = vec![
            make(Kind::Income, "5000000"),
            make(Kind::Expense, "150000"),
            make(Kind::Expense, "25000"),
            make(Kind::Income, "300"),
            make(Kind::Other("?".into()), "7"),
        ];

        let totals = compute_totals(&transactions);
        assert_eq!(totals.income, 5000300);
        assert_eq!(totals.expense, 175000);
        assert_eq!(totals.net(), compute_balance(&transactions));
    }
}
