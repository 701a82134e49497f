//! CSV statement importer.
//!
//! Bank and credit card CSV exports rarely identify the account they belong
//! to, so a [`CsvImporter`] is bound to one account and recognizes its files
//! by name. Every row must carry the running balance of the account.

use crate::config::{ColumnSpec, ConfigError, CsvConfig, ImporterConfig, ImporterType};
use crate::extract::extract_rows;
use crate::{periods, ImportResult, Importer, Row};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::error;

/// CSV file importer.
pub struct CsvImporter {
    config: ImporterConfig,
    filename_re: Option<Regex>,
    name: String,
}

impl CsvImporter {
    /// Create a new CSV importer with the given configuration.
    pub fn new(config: ImporterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let filename_re = config
            .filename_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| ConfigError::FilenamePattern {
                pattern: config.filename_pattern.clone().unwrap_or_default(),
                source,
            })?;
        let name = format!("csv: \"{}\"", config.account);
        Ok(Self {
            config,
            filename_re,
            name,
        })
    }

    /// The configuration of this importer.
    pub const fn config(&self) -> &ImporterConfig {
        &self.config
    }

    const fn csv_config(&self) -> &CsvConfig {
        match &self.config.importer_type {
            ImporterType::Csv(csv) => csv,
        }
    }

    /// Extract directives from CSV content read from `source`.
    ///
    /// A malformed row aborts parsing: the error is logged and reported as a
    /// warning, and no directives are extracted.
    pub fn extract_string(&self, source: &str, content: &str) -> ImportResult {
        match self.parse_rows(content) {
            Ok(rows) => extract_rows(source, rows, &self.config),
            Err(e) => {
                error!("{source}: {e:#}");
                ImportResult::empty().with_warning(format!("{source}: {e:#}"))
            }
        }
    }

    /// Read the rows of a CSV file.
    pub fn parse_file(&self, path: &Path) -> Result<Vec<Row>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        self.parse_rows(&content)
            .with_context(|| format!("Failed to parse: {}", path.display()))
    }

    /// Parse CSV content into rows, in file order.
    pub fn parse_rows(&self, content: &str) -> Result<Vec<Row>> {
        let csv_config = self.csv_config();
        let delimiter = u8::try_from(csv_config.delimiter)
            .with_context(|| format!("Delimiter '{}' is not ASCII", csv_config.delimiter))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(csv_config.has_header)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        // Build column name to index map from headers
        let header_map: HashMap<String, usize> = if csv_config.has_header {
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(i, h)| (h.trim().to_string(), i))
                .collect()
        } else {
            HashMap::new()
        };

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate().skip(csv_config.skip_rows) {
            let record = result.with_context(|| format!("Row {}: parse error", index + 1))?;
            let lineno = record
                .position()
                .map_or(index + 1, |pos| physical_line(content, pos.byte() as usize));

            if let Some(row) = self
                .parse_record(&record, csv_config, &header_map, lineno)
                .with_context(|| format!("Line {lineno}"))?
            {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn parse_record(
        &self,
        record: &csv::StringRecord,
        csv_config: &CsvConfig,
        header_map: &HashMap<String, usize>,
        lineno: usize,
    ) -> Result<Option<Row>> {
        let date_str = get_column(record, &csv_config.date_column, header_map)?.trim();
        if date_str.is_empty() {
            return Ok(None); // Skip empty rows
        }

        let date = NaiveDate::parse_from_str(date_str, &csv_config.date_format).with_context(
            || {
                format!(
                    "failed to parse date '{}' with format '{}'",
                    date_str, csv_config.date_format
                )
            },
        )?;

        let description = csv_config
            .narration_column
            .as_ref()
            .and_then(|col| get_column(record, col, header_map).ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let amount = parse_amount(record, csv_config, header_map)?;

        let balance_str = get_column(record, &csv_config.balance_column, header_map)?;
        let balance = parse_money_string(balance_str)
            .with_context(|| format!("failed to parse balance '{}'", balance_str.trim()))?;

        let (amount, balance) = if csv_config.invert_sign {
            (-amount, -balance)
        } else {
            (amount, balance)
        };

        Ok(Some(Row::new(lineno, date, description, amount, balance)))
    }
}

impl Importer for CsvImporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn identify(&self, path: &Path) -> bool {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return false;
        }
        match (&self.filename_re, path.file_name()) {
            (None, _) => true,
            // The pattern must match from the start of the name
            (Some(re), Some(name)) => re
                .find(&name.to_string_lossy())
                .is_some_and(|m| m.start() == 0),
            (Some(_), None) => false,
        }
    }

    fn extract(&self, path: &Path) -> Result<ImportResult> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        Ok(self.extract_string(&path.display().to_string(), &content))
    }

    fn description(&self) -> &str {
        "CSV bank or credit card statement with running balances"
    }

    fn file_account(&self, _path: &Path) -> Option<&str> {
        Some(&self.config.account)
    }

    fn file_name(&self, path: &Path) -> Option<String> {
        let basename = self.config.basename.as_ref()?;
        Some(match path.extension() {
            Some(ext) => format!("{basename}.{}", ext.to_string_lossy()),
            None => basename.clone(),
        })
    }

    fn file_date(&self, path: &Path) -> Result<Option<NaiveDate>> {
        let rows = self.parse_file(path)?;
        let Some(last) = rows.iter().map(|row| row.date).max() else {
            return Ok(None);
        };
        Ok(match self.config.first_day {
            Some(first_day) => periods::lowest_end(last, first_day),
            None => Some(last),
        })
    }
}

/// Line number of the record starting at `offset`, counting blank lines.
///
/// The reader reports the position before the blank lines it skips, so
/// those are stepped over first.
fn physical_line(content: &str, offset: usize) -> usize {
    let bytes = content.as_bytes();
    let start = bytes.get(offset..).map_or(bytes.len(), |rest| {
        offset + rest.iter().take_while(|&&b| b == b'\n' || b == b'\r').count()
    });
    bytes[..start].iter().filter(|&&b| b == b'\n').count() + 1
}

fn get_column<'a>(
    record: &'a csv::StringRecord,
    spec: &ColumnSpec,
    header_map: &HashMap<String, usize>,
) -> Result<&'a str> {
    let index = match spec {
        ColumnSpec::Index(i) => *i,
        ColumnSpec::Name(name) => *header_map
            .get(name)
            .with_context(|| format!("Column '{name}' not found in header"))?,
    };

    record
        .get(index)
        .with_context(|| format!("Column index {index} out of bounds"))
}

fn parse_amount(
    record: &csv::StringRecord,
    csv_config: &CsvConfig,
    header_map: &HashMap<String, usize>,
) -> Result<Decimal> {
    // Separate debit/credit columns: one of them is usually blank
    if csv_config.debit_column.is_some() || csv_config.credit_column.is_some() {
        let mut amount = Decimal::ZERO;
        let mut found = false;

        if let Some(debit_col) = &csv_config.debit_column {
            if let Some(val) = parse_money_string(get_column(record, debit_col, header_map)?) {
                amount -= val;
                found = true;
            }
        }

        if let Some(credit_col) = &csv_config.credit_column {
            if let Some(val) = parse_money_string(get_column(record, credit_col, header_map)?) {
                amount += val;
                found = true;
            }
        }

        if !found {
            bail!("no debit or credit amount");
        }
        return Ok(amount);
    }

    let amount_col = csv_config
        .amount_column
        .as_ref()
        .context("No amount column configured")?;

    let amount_str = get_column(record, amount_col, header_map)?;
    parse_money_string(amount_str)
        .with_context(|| format!("failed to parse amount '{}'", amount_str.trim()))
}

/// Parse a money string, handling currency symbols, parentheses for negatives, etc.
fn parse_money_string(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (is_negative, s) = match s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };

    // Remove currency symbols and thousands separators
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;

    Some(if is_negative { -value } else { value })
}
