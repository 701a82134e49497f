//! Directive types produced by statement importers.
//!
//! Only two beancount directives come out of a bank statement:
//!
//! - [`Transaction`] - One statement row, posted to the statement's account
//! - [`Balance`] - Assert that the account has a specific balance on a date
//!
//! Both carry [`Metadata`]; importers record the source file under
//! `filename` and a tie-break key under `lineno`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::Amount;

/// Metadata key holding the source file of a directive.
pub const META_FILENAME: &str = "filename";

/// Metadata key holding the tie-break position of a directive.
pub const META_LINENO: &str = "lineno";

/// Metadata value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaValue {
    /// String value
    String(String),
    /// Date value
    Date(NaiveDate),
    /// Numeric value
    Number(Decimal),
    /// Boolean value
    Bool(bool),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Date(d) => write!(f, "{d}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

/// Metadata is a key-value map attached to directives.
///
/// Keys are kept sorted so formatted output is deterministic.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Build the `filename`/`lineno` metadata importers attach to each directive.
#[must_use]
pub fn source_meta(filename: &str, lineno: usize) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert(
        META_FILENAME.to_string(),
        MetaValue::String(filename.to_string()),
    );
    meta.insert(
        META_LINENO.to_string(),
        MetaValue::Number(Decimal::from(lineno)),
    );
    meta
}

/// A posting within a transaction.
///
/// Imported transactions carry a single posting on the statement account;
/// the other leg is left for the user (or a categorizer) to fill in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The account for this posting
    pub account: String,
    /// The units; `None` leaves the amount to interpolation
    pub units: Option<Amount>,
    /// Whether this posting has the "!" flag
    pub flag: Option<char>,
}

impl Posting {
    /// Create a new posting with the given account and units.
    #[must_use]
    pub fn new(account: impl Into<String>, units: Amount) -> Self {
        Self {
            account: account.into(),
            units: Some(units),
            flag: None,
        }
    }

    /// Get the amount if available.
    #[must_use]
    pub const fn amount(&self) -> Option<&Amount> {
        self.units.as_ref()
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        if let Some(flag) = self.flag {
            write!(f, "{flag} ")?;
        }
        write!(f, "{}", self.account)?;
        if let Some(units) = &self.units {
            write!(f, "  {units}")?;
        }
        Ok(())
    }
}

/// Directive ordering priority for sorting.
///
/// When directives have the same date, balance assertions are checked at the
/// start of the day, before that day's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DirectivePriority {
    /// Balance assertions checked at start of day
    Balance = 0,
    /// Main entries
    Transaction = 1,
}

/// A directive produced by an importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Directive {
    /// Transaction directive - one statement row
    Transaction(Transaction),
    /// Balance assertion - asserts an account balance at a point in time
    Balance(Balance),
}

impl Directive {
    /// Get the date of this directive.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Transaction(t) => t.date,
            Self::Balance(b) => b.date,
        }
    }

    /// Get the metadata of this directive.
    #[must_use]
    pub const fn meta(&self) -> &Metadata {
        match self {
            Self::Transaction(t) => &t.meta,
            Self::Balance(b) => &b.meta,
        }
    }

    /// Get the `lineno` tie-break key, if one is recorded.
    #[must_use]
    pub fn lineno(&self) -> Option<Decimal> {
        match self.meta().get(META_LINENO) {
            Some(MetaValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Check if this is a transaction.
    #[must_use]
    pub const fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }

    /// Get as a transaction, if this is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(t) => Some(t),
            Self::Balance(_) => None,
        }
    }

    /// Get as a balance assertion, if this is one.
    #[must_use]
    pub const fn as_balance(&self) -> Option<&Balance> {
        match self {
            Self::Balance(b) => Some(b),
            Self::Transaction(_) => None,
        }
    }

    /// Get the directive type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Transaction(_) => "transaction",
            Self::Balance(_) => "balance",
        }
    }

    /// Get the sorting priority for this directive.
    #[must_use]
    pub const fn priority(&self) -> DirectivePriority {
        match self {
            Self::Balance(_) => DirectivePriority::Balance,
            Self::Transaction(_) => DirectivePriority::Transaction,
        }
    }
}

/// Sort directives by date, then by type priority, then by `lineno`.
///
/// Importers set `lineno` to the reconciled position of each transaction, so
/// this global sort keeps same-dated transactions in balance order. The sort
/// is stable; directives without a `lineno` keep their relative order.
pub fn sort_directives(directives: &mut [Directive]) {
    directives.sort_by(|a, b| {
        a.date()
            .cmp(&b.date())
            .then_with(|| a.priority().cmp(&b.priority()))
            .then_with(|| match (a.lineno(), b.lineno()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => Ordering::Equal,
            })
    });
}

/// A transaction directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date
    pub date: NaiveDate,
    /// Transaction flag (* or !)
    pub flag: char,
    /// Payee (optional)
    pub payee: Option<String>,
    /// Narration (description)
    pub narration: String,
    /// Transaction metadata
    pub meta: Metadata,
    /// Postings (account entries)
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Create a new transaction.
    #[must_use]
    pub fn new(date: NaiveDate, narration: impl Into<String>) -> Self {
        Self {
            date,
            flag: '*',
            payee: None,
            narration: narration.into(),
            meta: Metadata::new(),
            postings: Vec::new(),
        }
    }

    /// Replace the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.date, self.flag)?;
        if let Some(payee) = &self.payee {
            write!(f, "\"{payee}\" ")?;
        }
        write!(f, "\"{}\"", self.narration)?;
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// A balance assertion directive.
///
/// Asserts that an account has a specific balance at the beginning of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Assertion date
    pub date: NaiveDate,
    /// Account to check
    pub account: String,
    /// Expected amount
    pub amount: Amount,
    /// Metadata
    pub meta: Metadata,
}

impl Balance {
    /// Create a new balance assertion.
    #[must_use]
    pub fn new(date: NaiveDate, account: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            account: account.into(),
            amount,
            meta: Metadata::new(),
        }
    }

    /// Replace the metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} balance {} {}", self.date, self.account, self.amount)
    }
}
