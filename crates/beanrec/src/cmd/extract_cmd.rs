//! beanrec-extract - Extract transactions from bank statements.
//!
//! Rows are put in the order their running balances agree with before
//! transactions and balance assertions are printed in beancount format.
//!
//! # Usage
//!
//! ```bash
//! beanrec-extract bank.csv --account Assets:Bank:Chequing
//! beanrec-extract statement.csv --config bank-config.json
//! beanrec-extract visa.csv --config visa.json --file-info
//! ```

use anyhow::{Context, Result};
use beanrec_core::{format_directive, sort_directives, Directive, FormatConfig};
use beanrec_importer::config::ColumnSpec;
use beanrec_importer::ImporterConfig;
use beanrec_importer::ImporterRegistry;
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Extract transactions from bank statements.
#[derive(Parser, Debug)]
#[command(name = "beanrec-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The statement files to extract transactions from
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// JSON importer configuration (replaces the column options below)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Account the statements belong to (required without --config)
    #[arg(short, long, required_unless_present = "config")]
    account: Option<String>,

    /// Currency for amounts
    #[arg(short, long, default_value = "USD")]
    currency: String,

    /// First day of the monthly statement period (1-28)
    #[arg(long)]
    first_day: Option<u32>,

    /// Only handle files whose name matches this regular expression
    #[arg(long)]
    filename_pattern: Option<String>,

    /// Base name identified files should be renamed to
    #[arg(long)]
    basename: Option<String>,

    /// Date column name or index
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Date format (strftime-style)
    #[arg(long, default_value = "%Y-%m-%d")]
    date_format: String,

    /// Description column name or index
    #[arg(long, default_value = "Description")]
    narration_column: String,

    /// Amount column name or index
    #[arg(long, default_value = "Amount")]
    amount_column: String,

    /// Debit column (for separate debit/credit columns)
    #[arg(long)]
    debit_column: Option<String>,

    /// Credit column (for separate debit/credit columns)
    #[arg(long)]
    credit_column: Option<String>,

    /// Running balance column name or index
    #[arg(long, default_value = "Balance")]
    balance_column: String,

    /// CSV delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Number of rows to skip
    #[arg(long, default_value = "0")]
    skip_rows: usize,

    /// Invert sign of amounts and balances
    #[arg(long)]
    invert_sign: bool,

    /// CSV has no header row
    #[arg(long)]
    no_header: bool,

    /// Sort the entries of all files by date
    #[arg(long)]
    sort: bool,

    /// Print filename and lineno metadata
    #[arg(long)]
    show_source: bool,

    /// Print where each file should be filed instead of its entries
    #[arg(long)]
    file_info: bool,

    /// Log reconciliation details
    #[arg(short, long)]
    verbose: bool,
}

/// Main entry point for the extract command.
pub fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    // Import warnings are printed from the results, not from the log
    let default = if verbose {
        "beanrec=debug"
    } else {
        "beanrec=warn,beanrec_importer=off"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns whether every file was processed.
fn run(args: &Args) -> Result<bool> {
    let config = importer_config(args)?;
    let mut registry = ImporterRegistry::new();
    registry.register_boxed(config.importer()?);

    if args.file_info {
        return file_info(args, &registry);
    }

    let mut ok = true;
    let mut directives: Vec<Directive> = Vec::new();
    for file in &args.files {
        match registry.extract(file) {
            Ok(result) => {
                for warning in &result.warnings {
                    eprintln!("warning: {warning}");
                }
                info!(
                    "Extracted {} entries from {}",
                    result.directives.len(),
                    file.display()
                );
                directives.extend(result.directives);
            }
            Err(e) => {
                eprintln!("error: {e:#}");
                ok = false;
            }
        }
    }

    if args.sort {
        sort_directives(&mut directives);
    }

    let fmt_config = FormatConfig::default().with_source(args.show_source);
    let mut stdout = io::stdout().lock();
    for directive in &directives {
        writeln!(stdout, "{}", format_directive(directive, &fmt_config))?;
    }

    Ok(ok)
}

fn file_info(args: &Args, registry: &ImporterRegistry) -> Result<bool> {
    let mut ok = true;
    let mut stdout = io::stdout().lock();
    for file in &args.files {
        match registry.file_info(file) {
            Ok(Some(info)) => {
                writeln!(stdout, "{}", file.display())?;
                writeln!(stdout, "  importer: {}", info.importer)?;
                if let Some(account) = &info.account {
                    writeln!(stdout, "  account:  {account}")?;
                }
                if let Some(date) = info.date {
                    writeln!(stdout, "  date:     {date}")?;
                }
                if let Some(name) = &info.name {
                    writeln!(stdout, "  name:     {name}")?;
                }
            }
            Ok(None) => warn!("{}: not identified", file.display()),
            Err(e) => {
                eprintln!("error: {e:#}");
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn importer_config(args: &Args) -> Result<ImporterConfig> {
    if let Some(path) = &args.config {
        return load_config(path);
    }

    let mut builder = ImporterConfig::csv()
        .currency(&args.currency)
        .date_format(&args.date_format)
        .delimiter(args.delimiter)
        .skip_rows(args.skip_rows)
        .invert_sign(args.invert_sign)
        .has_header(!args.no_header);

    builder = match ColumnSpec::parse(&args.date_column) {
        ColumnSpec::Index(i) => builder.date_column_index(i),
        ColumnSpec::Name(name) => builder.date_column(name),
    };
    builder = match ColumnSpec::parse(&args.narration_column) {
        ColumnSpec::Index(i) => builder.narration_column_index(i),
        ColumnSpec::Name(name) => builder.narration_column(name),
    };
    builder = match ColumnSpec::parse(&args.amount_column) {
        ColumnSpec::Index(i) => builder.amount_column_index(i),
        ColumnSpec::Name(name) => builder.amount_column(name),
    };
    builder = match ColumnSpec::parse(&args.balance_column) {
        ColumnSpec::Index(i) => builder.balance_column_index(i),
        ColumnSpec::Name(name) => builder.balance_column(name),
    };

    if let Some(account) = &args.account {
        builder = builder.account(account);
    }
    if let Some(debit) = &args.debit_column {
        builder = builder.debit_column(debit);
    }
    if let Some(credit) = &args.credit_column {
        builder = builder.credit_column(credit);
    }
    if let Some(day) = args.first_day {
        builder = builder.first_day(day);
    }
    if let Some(pattern) = &args.filename_pattern {
        builder = builder.filename_pattern(pattern);
    }
    if let Some(basename) = &args.basename {
        builder = builder.basename(basename);
    }

    Ok(builder.build()?)
}

fn load_config(path: &Path) -> Result<ImporterConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    ImporterConfig::from_json(&json)
        .with_context(|| format!("Invalid config: {}", path.display()))
}
