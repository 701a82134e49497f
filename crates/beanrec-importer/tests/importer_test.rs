//! End-to-end tests for importing statement files from disk.

use beanrec_core::{format_directive, sort_directives, Directive, FormatConfig};
use beanrec_importer::{Importer, ImporterConfig, ImporterRegistry};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const VISA_CSV: &str = "\
Date,Description,Amount,Balance
03/02/2024,RESTAURANT,45.00,245.00
03/02/2024,BOOKSTORE,20.00,265.00
02/20/2024,GROCERIES,80.00,200.00
02/14/2024,PAYMENT,-100.00,120.00
02/10/2024,GAS STATION,60.00,220.00
02/10/2024,PHARMACY,35.00,160.00
";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn visa_config(first_day: Option<u32>) -> ImporterConfig {
    let mut builder = ImporterConfig::csv()
        .account("Liabilities:CreditCard:Visa")
        .currency("CAD")
        .date_format("%m/%d/%Y")
        .filename_pattern(r"^visa.*\.csv$")
        .basename("visa")
        .invert_sign(true);
    if let Some(day) = first_day {
        builder = builder.first_day(day);
    }
    builder.build().unwrap()
}

#[test]
fn test_extract_credit_card_statement() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "visa_march.csv", VISA_CSV);

    let result = visa_config(None).extract(&path).unwrap();
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let narrations: Vec<_> = result
        .directives
        .iter()
        .filter_map(Directive::as_transaction)
        .map(|t| t.narration.as_str())
        .collect();
    assert_eq!(
        narrations,
        vec![
            "PHARMACY",
            "GAS STATION",
            "PAYMENT",
            "GROCERIES",
            "RESTAURANT",
            "BOOKSTORE"
        ]
    );

    let balances: Vec<_> = result
        .directives
        .iter()
        .filter_map(Directive::as_balance)
        .collect();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].date, date(2024, 3, 3));
    assert_eq!(balances[0].amount.number, dec!(-265.00));
}

#[test]
fn test_extract_with_statement_periods() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "visa_march.csv", VISA_CSV);

    let result = visa_config(Some(15)).extract(&path).unwrap();
    let balances: Vec<_> = result
        .directives
        .iter()
        .filter_map(Directive::as_balance)
        .map(|b| (b.date, b.amount.number))
        .collect();
    assert_eq!(
        balances,
        vec![
            (date(2024, 3, 15), dec!(-265.00)),
            (date(2024, 2, 15), dec!(-120.00)),
        ]
    );
}

#[test]
fn test_sorted_output_keeps_reconciled_order() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "visa_march.csv", VISA_CSV);

    let mut directives = visa_config(Some(15)).extract(&path).unwrap().directives;
    sort_directives(&mut directives);

    let text: String = directives
        .iter()
        .map(|d| format_directive(d, &FormatConfig::default()))
        .collect();
    let pharmacy = text.find("PHARMACY").unwrap();
    let gas = text.find("GAS STATION").unwrap();
    let restaurant = text.find("RESTAURANT").unwrap();
    let bookstore = text.find("BOOKSTORE").unwrap();
    assert!(pharmacy < gas);
    assert!(restaurant < bookstore);
    assert!(text.contains("2024-02-15 balance Liabilities:CreditCard:Visa -120.00 CAD"));
}

#[test]
fn test_unreconcilable_statement_still_extracts_transactions() {
    let dir = TempDir::new().unwrap();
    let content = "\
Date,Description,Amount,Balance
02/10/2024,GAS STATION,60.00,60.00
02/11/2024,TYPO,10.00,75.00
";
    let path = write_file(&dir, "visa_bad.csv", content);

    let result = visa_config(None).extract(&path).unwrap();
    assert_eq!(result.directives.len(), 2);
    assert!(result.directives.iter().all(Directive::is_transaction));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].ends_with(":3: cannot reorder rows to agree with balance values"));
}

#[test]
fn test_registry_files_statement() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "visa_march.csv", VISA_CSV);
    let other = write_file(&dir, "chequing.csv", "Date,Description,Amount,Balance\n");

    let mut registry = ImporterRegistry::new();
    registry.register_boxed(visa_config(Some(15)).importer().unwrap());

    let info = registry.file_info(&path).unwrap().unwrap();
    assert_eq!(info.importer, "csv: \"Liabilities:CreditCard:Visa\"");
    assert_eq!(info.account.as_deref(), Some("Liabilities:CreditCard:Visa"));
    assert_eq!(info.date, Some(date(2024, 3, 14)));
    assert_eq!(info.name.as_deref(), Some("visa.csv"));

    assert!(registry.file_info(&other).unwrap().is_none());
}

#[test]
fn test_file_date_without_period_is_last_row() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "visa_march.csv", VISA_CSV);
    let importer = visa_config(None).importer().unwrap();
    assert_eq!(importer.file_date(&path).unwrap(), Some(date(2024, 3, 2)));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = visa_config(None)
        .extract(&dir.path().join("visa_missing.csv"))
        .unwrap_err();
    assert!(err.to_string().contains("Failed to open file"));
}
