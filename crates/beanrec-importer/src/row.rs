//! A parsed statement row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a bank or credit card statement.
///
/// `amount` and `balance` use the ledger's sign convention for the statement
/// account: for an asset account a deposit is positive, for a liability
/// account a charge is negative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row {
    /// Line of the source file this row came from. Only used in diagnostics.
    pub lineno: usize,
    /// Date of the transaction.
    pub date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Signed value of the transaction.
    pub amount: Decimal,
    /// Balance of the account immediately after the transaction.
    pub balance: Decimal,
}

impl Row {
    /// Create a new row.
    pub fn new(
        lineno: usize,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        balance: Decimal,
    ) -> Self {
        Self {
            lineno,
            date,
            description: description.into(),
            amount,
            balance,
        }
    }

    /// The balance the account must have had just before this row.
    #[must_use]
    pub fn opening_balance(&self) -> Decimal {
        self.balance - self.amount
    }

    /// Whether this row directly follows a row that left `previous` as balance.
    #[must_use]
    pub fn follows(&self, previous: Decimal) -> bool {
        previous + self.amount == self.balance
    }
}
