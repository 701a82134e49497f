//! Beancount statement import tools.
//!
//! This crate provides the command-line front end of beanrec:
//!
//! - `beanrec-extract`: Extract transactions and balance assertions from
//!   CSV statements, or tell where each statement should be filed
//!
//! # Example Usage
//!
//! ```bash
//! beanrec-extract chequing.csv --account Assets:Bank:Chequing --currency CAD
//! beanrec-extract visa_*.csv --config visa.json --sort
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
