//! Configuration for importers.
//!
//! A configuration is either assembled with the builder returned by
//! [`ImporterConfig::csv`] or read from JSON with
//! [`ImporterConfig::from_json`]. Both paths validate it once, up front;
//! extraction never fails on configuration.

use crate::csv_importer::CsvImporter;
use crate::periods::{FirstDay, PeriodError};
use crate::{ImportResult, Importer};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Currency used when none is configured.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Errors in an importer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The target account is empty.
    #[error("no target account configured")]
    MissingAccount,

    /// The first day of the billing period is out of range.
    #[error(transparent)]
    FirstDay(#[from] PeriodError),

    /// The file name pattern is not a valid regular expression.
    #[error("invalid file name pattern '{pattern}': {source}")]
    FilenamePattern {
        /// The offending pattern.
        pattern: String,
        /// The regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// Neither an amount column nor debit/credit columns are configured.
    #[error("no amount column configured")]
    MissingAmountColumn,

    /// The JSON configuration could not be read.
    #[error("invalid importer configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for an importer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// The target account for imported transactions.
    pub account: String,
    /// The currency of every extracted amount.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// First day of the monthly statement period.
    ///
    /// Without it, one balance assertion follows the last transaction and
    /// the file date is the date of that transaction. With it, one balance
    /// assertion is placed at the start of each statement period and the
    /// file date is the end of the period holding the last transaction.
    #[serde(default)]
    pub first_day: Option<FirstDay>,
    /// Optional new base name (without extension) for identified files.
    #[serde(default)]
    pub basename: Option<String>,
    /// Regular expression the file name must match, from its first
    /// character, to be identified.
    #[serde(default)]
    pub filename_pattern: Option<String>,
    /// The importer type and its specific configuration.
    #[serde(flatten)]
    pub importer_type: ImporterType,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Type of importer with its specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImporterType {
    /// CSV file importer.
    Csv(CsvConfig),
}

/// Configuration specific to CSV imports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// The column name or index for the date.
    pub date_column: ColumnSpec,
    /// The date format (strftime-style).
    pub date_format: String,
    /// The column name or index for the description.
    pub narration_column: Option<ColumnSpec>,
    /// The column name or index for the amount.
    pub amount_column: Option<ColumnSpec>,
    /// The column name or index for debit amounts (if separate from credit).
    pub debit_column: Option<ColumnSpec>,
    /// The column name or index for credit amounts (if separate from debit).
    pub credit_column: Option<ColumnSpec>,
    /// The column name or index for the running balance.
    pub balance_column: ColumnSpec,
    /// Whether the CSV has a header row.
    pub has_header: bool,
    /// The field delimiter.
    pub delimiter: char,
    /// Number of rows to skip at the beginning.
    pub skip_rows: usize,
    /// Whether to invert the sign of amounts and balances.
    ///
    /// Credit card statements show charges and the amount owed as positive
    /// numbers; a liability account wants them negative.
    pub invert_sign: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            date_column: ColumnSpec::Name("Date".to_string()),
            date_format: "%Y-%m-%d".to_string(),
            narration_column: Some(ColumnSpec::Name("Description".to_string())),
            amount_column: Some(ColumnSpec::Name("Amount".to_string())),
            debit_column: None,
            credit_column: None,
            balance_column: ColumnSpec::Name("Balance".to_string()),
            has_header: true,
            delimiter: ',',
            skip_rows: 0,
            invert_sign: false,
        }
    }
}

/// Specification for a column in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Column specified by zero-based index.
    Index(usize),
    /// Column specified by name (from header).
    Name(String),
}

impl ColumnSpec {
    /// Parse a column given on the command line: a number is an index.
    pub fn parse(spec: &str) -> Self {
        spec.parse()
            .map_or_else(|_| Self::Name(spec.to_string()), Self::Index)
    }
}

impl ImporterConfig {
    /// Start building a CSV importer configuration.
    pub fn csv() -> CsvConfigBuilder {
        CsvConfigBuilder::new()
    }

    /// Read and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.currency = config.currency.to_uppercase();
        config.validate()?;
        Ok(config)
    }

    /// Check the parts of the configuration serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.account.trim().is_empty() {
            return Err(ConfigError::MissingAccount);
        }
        if let Some(pattern) = &self.filename_pattern {
            regex::Regex::new(pattern).map_err(|source| ConfigError::FilenamePattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        match &self.importer_type {
            ImporterType::Csv(csv) => {
                if csv.amount_column.is_none()
                    && csv.debit_column.is_none()
                    && csv.credit_column.is_none()
                {
                    return Err(ConfigError::MissingAmountColumn);
                }
            }
        }
        Ok(())
    }

    /// Create the importer this configuration describes.
    pub fn importer(&self) -> Result<Box<dyn Importer>, ConfigError> {
        match &self.importer_type {
            ImporterType::Csv(_) => Ok(Box::new(CsvImporter::new(self.clone())?)),
        }
    }

    /// Extract transactions from a file.
    pub fn extract(&self, path: &Path) -> Result<ImportResult> {
        self.importer()?.extract(path)
    }

    /// Extract transactions from string content.
    pub fn extract_from_string(&self, content: &str) -> Result<ImportResult> {
        match &self.importer_type {
            ImporterType::Csv(_) => {
                let importer = CsvImporter::new(self.clone())?;
                Ok(importer.extract_string("<string>", content))
            }
        }
    }
}

/// Builder for CSV importer configuration.
pub struct CsvConfigBuilder {
    account: Option<String>,
    currency: Option<String>,
    first_day: Option<u32>,
    basename: Option<String>,
    filename_pattern: Option<String>,
    config: CsvConfig,
}

impl CsvConfigBuilder {
    /// Create a new CSV config builder.
    pub fn new() -> Self {
        Self {
            account: None,
            currency: None,
            first_day: None,
            basename: None,
            filename_pattern: None,
            config: CsvConfig::default(),
        }
    }

    /// Set the target account.
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set the currency for amounts.
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Set the first day of the monthly statement period, in `[1, 28]`.
    pub const fn first_day(mut self, day: u32) -> Self {
        self.first_day = Some(day);
        self
    }

    /// Rename identified files to this base name.
    pub fn basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    /// Only identify files whose name matches this regular expression.
    pub fn filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = Some(pattern.into());
        self
    }

    /// Set the date column by name.
    pub fn date_column(mut self, name: impl Into<String>) -> Self {
        self.config.date_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the date column by index.
    pub fn date_column_index(mut self, index: usize) -> Self {
        self.config.date_column = ColumnSpec::Index(index);
        self
    }

    /// Set the date format (strftime-style).
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.config.date_format = format.into();
        self
    }

    /// Set the description column by name.
    pub fn narration_column(mut self, name: impl Into<String>) -> Self {
        self.config.narration_column = Some(ColumnSpec::Name(name.into()));
        self
    }

    /// Set the description column by index.
    pub fn narration_column_index(mut self, index: usize) -> Self {
        self.config.narration_column = Some(ColumnSpec::Index(index));
        self
    }

    /// Set the amount column by name.
    pub fn amount_column(mut self, name: impl Into<String>) -> Self {
        self.config.amount_column = Some(ColumnSpec::Name(name.into()));
        self
    }

    /// Set the amount column by index.
    pub fn amount_column_index(mut self, index: usize) -> Self {
        self.config.amount_column = Some(ColumnSpec::Index(index));
        self
    }

    /// Set separate debit column by name.
    pub fn debit_column(mut self, name: impl Into<String>) -> Self {
        self.config.amount_column = None;
        self.config.debit_column = Some(ColumnSpec::Name(name.into()));
        self
    }

    /// Set separate credit column by name.
    pub fn credit_column(mut self, name: impl Into<String>) -> Self {
        self.config.amount_column = None;
        self.config.credit_column = Some(ColumnSpec::Name(name.into()));
        self
    }

    /// Set the balance column by name.
    pub fn balance_column(mut self, name: impl Into<String>) -> Self {
        self.config.balance_column = ColumnSpec::Name(name.into());
        self
    }

    /// Set the balance column by index.
    pub fn balance_column_index(mut self, index: usize) -> Self {
        self.config.balance_column = ColumnSpec::Index(index);
        self
    }

    /// Set whether the CSV has a header row.
    pub const fn has_header(mut self, has_header: bool) -> Self {
        self.config.has_header = has_header;
        self
    }

    /// Set the field delimiter.
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Set the number of rows to skip.
    pub const fn skip_rows(mut self, count: usize) -> Self {
        self.config.skip_rows = count;
        self
    }

    /// Set whether to invert the sign of amounts and balances.
    pub const fn invert_sign(mut self, invert: bool) -> Self {
        self.config.invert_sign = invert;
        self
    }

    /// Build and validate the importer configuration.
    pub fn build(self) -> Result<ImporterConfig, ConfigError> {
        let first_day = self.first_day.map(FirstDay::new).transpose()?;
        let config = ImporterConfig {
            account: self.account.unwrap_or_default(),
            currency: self
                .currency
                .unwrap_or_else(default_currency)
                .to_uppercase(),
            first_day,
            basename: self.basename,
            filename_pattern: self.filename_pattern,
            importer_type: ImporterType::Csv(self.config),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for CsvConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
