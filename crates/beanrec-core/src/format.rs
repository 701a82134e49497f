//! Beancount text output for imported directives.
//!
//! Provides pretty-printing with configurable amount alignment, so extracted
//! entries can be pasted straight into a ledger file.

use crate::{Amount, Balance, Directive, MetaValue, Metadata, Posting, Transaction};
use std::fmt::Write;

/// Formatter configuration.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Column to align amounts to (default: 60).
    pub amount_column: usize,
    /// Indentation for postings and metadata.
    pub indent: String,
    /// Whether to print `filename`/`lineno` metadata.
    pub show_source: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            amount_column: 60,
            indent: "  ".to_string(),
            show_source: false,
        }
    }
}

impl FormatConfig {
    /// Create a new config with the specified amount column.
    #[must_use]
    pub fn with_column(column: usize) -> Self {
        Self {
            amount_column: column,
            ..Default::default()
        }
    }

    /// Also print source metadata.
    #[must_use]
    pub const fn with_source(mut self, show: bool) -> Self {
        self.show_source = show;
        self
    }
}

/// Format a directive to a string.
pub fn format_directive(directive: &Directive, config: &FormatConfig) -> String {
    match directive {
        Directive::Transaction(txn) => format_transaction(txn, config),
        Directive::Balance(bal) => format_balance(bal, config),
    }
}

fn format_transaction(txn: &Transaction, config: &FormatConfig) -> String {
    let mut out = String::new();

    write!(out, "{} {}", txn.date, txn.flag).unwrap();
    if let Some(payee) = &txn.payee {
        write!(out, " \"{}\"", escape_string(payee)).unwrap();
    }
    write!(out, " \"{}\"", escape_string(&txn.narration)).unwrap();
    out.push('\n');

    if config.show_source {
        format_meta(&mut out, &txn.meta, config);
    }

    for posting in &txn.postings {
        out.push_str(&format_posting(posting, config));
        out.push('\n');
    }

    out
}

/// Format a posting with amount alignment.
fn format_posting(posting: &Posting, config: &FormatConfig) -> String {
    let mut line = String::new();
    line.push_str(&config.indent);

    if let Some(flag) = posting.flag {
        write!(line, "{flag} ").unwrap();
    }
    line.push_str(&posting.account);

    if let Some(units) = &posting.units {
        let amount_str = format_amount(units);
        // Align the end of the amount on the configured column
        let target_col = config.amount_column.saturating_sub(amount_str.len());
        if line.len() < target_col {
            line.push_str(&" ".repeat(target_col - line.len()));
        } else {
            line.push_str("  ");
        }
        line.push_str(&amount_str);
    }

    line
}

fn format_balance(bal: &Balance, config: &FormatConfig) -> String {
    let mut out = format!(
        "{} balance {} {}\n",
        bal.date,
        bal.account,
        format_amount(&bal.amount)
    );
    if config.show_source {
        format_meta(&mut out, &bal.meta, config);
    }
    out
}

fn format_meta(out: &mut String, meta: &Metadata, config: &FormatConfig) {
    for (key, value) in meta {
        let value = match value {
            MetaValue::String(s) => format!("\"{}\"", escape_string(s)),
            other => other.to_string(),
        };
        writeln!(out, "{}{key}: {value}", config.indent).unwrap();
    }
}

fn format_amount(amount: &Amount) -> String {
    format!("{} {}", amount.number, amount.currency)
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::source_meta;
    use crate::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_format_imported_transaction() {
        let txn = Transaction::new(date(2024, 1, 15), "GROCERY \"FRESH\" MART").with_posting(
            Posting::new("Assets:Bank:Checking", Amount::new(dec!(-85.23), "CAD")),
        );

        let formatted = format_directive(&Directive::Transaction(txn), &FormatConfig::with_column(50));
        let mut lines = formatted.lines();
        assert_eq!(
            lines.next(),
            Some("2024-01-15 * \"GROCERY \\\"FRESH\\\" MART\"")
        );
        let posting = lines.next().unwrap();
        assert!(posting.starts_with("  Assets:Bank:Checking "));
        assert!(posting.ends_with("-85.23 CAD"));
        assert_eq!(posting.len(), 50);
    }

    #[test]
    fn test_format_balance() {
        let bal = Balance::new(
            date(2024, 1, 1),
            "Assets:Bank",
            Amount::new(dec!(1000.00), "USD"),
        );
        let formatted = format_directive(&Directive::Balance(bal), &FormatConfig::default());
        assert_eq!(formatted, "2024-01-01 balance Assets:Bank 1000.00 USD\n");
    }

    #[test]
    fn test_format_with_source_meta() {
        let bal = Balance::new(
            date(2024, 1, 1),
            "Assets:Bank",
            Amount::new(dec!(5), "USD"),
        )
        .with_meta(source_meta("stmt.csv", 0));
        let config = FormatConfig::default().with_source(true);
        let formatted = format_directive(&Directive::Balance(bal), &config);
        assert_eq!(
            formatted,
            "2024-01-01 balance Assets:Bank 5 USD\n  filename: \"stmt.csv\"\n  lineno: 0\n"
        );
    }

    #[test]
    fn test_format_payee_and_posting_flag() {
        let mut txn = Transaction::new(date(2024, 5, 2), "Refill");
        txn.payee = Some("Pharmacy".to_string());
        let mut posting = Posting::new("Assets:Bank", Amount::new(dec!(-12.00), "CAD"));
        posting.flag = Some('!');
        txn.postings.push(posting);

        let formatted = format_directive(&Directive::Transaction(txn), &FormatConfig::default());
        let mut lines = formatted.lines();
        assert_eq!(lines.next(), Some("2024-05-02 * \"Pharmacy\" \"Refill\""));
        let posting = lines.next().unwrap();
        assert!(posting.starts_with("  ! Assets:Bank "));
        assert_eq!(posting.len(), 60);
    }

    #[test]
    fn test_long_account_keeps_two_spaces() {
        let posting = Posting::new(
            "Liabilities:CreditCard:SomeVeryLongIssuerName",
            Amount::new(dec!(12.00), "CAD"),
        );
        let line = format_posting(&posting, &FormatConfig::with_column(20));
        assert!(line.ends_with("SomeVeryLongIssuerName  12.00 CAD"));
    }
}
