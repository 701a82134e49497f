//! Statement import for beanrec
//!
//! This crate extracts beancount transactions and balance assertions from
//! bank and credit card statements whose rows carry a running balance.
//!
//! # Overview
//!
//! Statement rows often come out of order: same-day transactions have no
//! intra-day order and some exports list newest first. [`reconcile()`] finds
//! the order in which every balance equals the previous one plus the row's
//! amount. [`extract_entries`] then emits one transaction per row and, when
//! the balances could be trusted, balance assertions: one after the last
//! transaction, or one per statement period when a first day of period is
//! configured.
//!
//! Importers implement the [`Importer`] trait; [`CsvImporter`] handles CSV
//! exports.
//!
//! # Example
//!
//! ```rust,no_run
//! use beanrec_importer::{Importer, ImporterConfig};
//! use std::path::Path;
//!
//! let config = ImporterConfig::csv()
//!     .account("Liabilities:CreditCard:Visa")
//!     .currency("CAD")
//!     .date_format("%m/%d/%Y")
//!     .balance_column("Balance")
//!     .invert_sign(true)
//!     .first_day(15)
//!     .build()?;
//!
//! let result = config.extract(Path::new("visa.csv"))?;
//! for warning in &result.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod csv_importer;
pub mod dates;
pub mod extract;
pub mod periods;
pub mod reconcile;
pub mod registry;
pub mod row;

use anyhow::Result;
use beanrec_core::Directive;
use chrono::NaiveDate;
use std::path::Path;

pub use config::{ConfigError, ImporterConfig};
pub use csv_importer::CsvImporter;
pub use extract::{extract_entries, extract_rows};
pub use periods::FirstDay;
pub use reconcile::{reconcile, Reconciled};
pub use registry::{FileInfo, ImporterRegistry};
pub use row::Row;

/// Result of an import operation.
#[derive(Debug, Clone)]
pub struct ImportResult {
    /// The extracted directives.
    pub directives: Vec<Directive>,
    /// Warnings encountered during import.
    pub warnings: Vec<String>,
}

impl ImportResult {
    /// Create a new import result.
    pub const fn new(directives: Vec<Directive>) -> Self {
        Self {
            directives,
            warnings: Vec::new(),
        }
    }

    /// Create an empty import result.
    pub const fn empty() -> Self {
        Self {
            directives: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a warning to the result.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

/// Trait for file importers.
///
/// Besides extracting directives, an importer can tell which account a file
/// belongs to, how it should be renamed and which date it should be filed
/// under.
pub trait Importer: Send + Sync {
    /// Returns the name of this importer.
    fn name(&self) -> &str;

    /// Check if this importer can handle the given file.
    ///
    /// This method should be fast - it typically checks file extension,
    /// file name patterns, or other quick heuristics.
    fn identify(&self, path: &Path) -> bool;

    /// Extract directives from the given file.
    fn extract(&self, path: &Path) -> Result<ImportResult>;

    /// Returns a description of what this importer handles.
    fn description(&self) -> &str {
        self.name()
    }

    /// The account the given file belongs to.
    fn file_account(&self, _path: &Path) -> Option<&str> {
        None
    }

    /// New file name (without directory) for the given file, if it should be renamed.
    fn file_name(&self, _path: &Path) -> Option<String> {
        None
    }

    /// The date to file the given file under.
    fn file_date(&self, _path: &Path) -> Result<Option<NaiveDate>> {
        Ok(None)
    }
}

/// Extract transactions from file contents (useful for testing).
pub fn extract_from_string(content: &str, config: &ImporterConfig) -> Result<ImportResult> {
    config.extract_from_string(content)
}
