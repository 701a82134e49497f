//! Amount type representing a decimal number with a currency.
//!
//! Statement amounts are compared exactly: an [`Amount`] never applies a
//! tolerance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount is a quantity paired with a currency.
///
/// # Examples
///
/// ```
/// use beanrec_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let amount = Amount::new(dec!(100.00), "CAD");
/// assert_eq!(amount.number, dec!(100.00));
/// assert_eq!(amount.currency, "CAD");
/// assert_eq!(amount.to_string(), "100.00 CAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The decimal quantity
    pub number: Decimal,
    /// The currency code (e.g., "USD", "CAD")
    pub currency: String,
}

impl Amount {
    /// Create a new amount.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}
