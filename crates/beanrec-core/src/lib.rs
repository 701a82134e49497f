//! Core ledger types for beanrec
//!
//! This crate provides the small set of beancount entry types that statement
//! importers produce:
//!
//! - [`Amount`] - A decimal number with a currency
//! - [`Posting`] - One leg of a transaction
//! - [`Directive`] - A [`Transaction`] or a [`Balance`] assertion
//!
//! # Example
//!
//! ```
//! use beanrec_core::{format_directive, Amount, Balance, Directive, FormatConfig};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//! let balance = Balance::new(date, "Assets:Bank:Checking", Amount::new(dec!(120.00), "CAD"));
//!
//! let text = format_directive(&Directive::Balance(balance), &FormatConfig::default());
//! assert_eq!(text, "2024-02-01 balance Assets:Bank:Checking 120.00 CAD\n");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod directive;
pub mod format;

pub use amount::Amount;
pub use directive::{
    sort_directives, source_meta, Balance, Directive, DirectivePriority, MetaValue, Metadata,
    Posting, Transaction, META_FILENAME, META_LINENO,
};
pub use format::{format_directive, FormatConfig};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
