use std::fmt;

/// Amounts are whole rupiah; there is no fractional unit.
pub type Rupiah = i64;

/// Parse an amount as typed by the user: one or more ASCII digits, nothing else.
/// Signs, separators and whitespace are rejected rather than interpreted.
/// Example: "5000000" -> 5000000, "-5" -> error, "1.000" -> error
pub fn parse_amount(input: &str) -> Result<Rupiah, ParseAmountError> {
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError::NotANumber);
    }
    input.parse().map_err(|_| ParseAmountError::TooLarge)
}

/// Format with a dot every three digits, the way the balance label shows it.
/// Example: 4850000 -> "4.850.000", -1500 -> "-1.500"
pub fn format_thousands(amount: Rupiah) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Example: 4850000 -> "Rp 4.850.000"
pub fn format_rupiah(amount: Rupiah) -> String {
    format!("Rp {}", format_thousands(amount))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    NotANumber,
    TooLarge,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::NotANumber => {
                write!(f, "amount must contain only the digits 0-9")
            }
            ParseAmountError::TooLarge => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}
