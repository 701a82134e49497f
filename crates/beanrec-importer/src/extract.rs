//! Turning reconciled rows into directives.
//!
//! Every row becomes a transaction. Balance assertions are only emitted when
//! the rows could be put in an order that agrees with their balance values:
//! either a single assertion the day after the last transaction, or, when a
//! statement period is configured, one at the start of every period that
//! follows a row.

use beanrec_core::{source_meta, Amount, Balance, Directive, Posting, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::ImporterConfig;
use crate::periods::{self, FirstDay};
use crate::reconcile::{reconcile, Reconciled};
use crate::{ImportResult, Row};

/// Sort `rows` by date, reconcile them and extract their directives.
///
/// `source` names the statement in metadata and diagnostics.
pub fn extract_rows(source: &str, mut rows: Vec<Row>, config: &ImporterConfig) -> ImportResult {
    rows.sort_by_key(|row| row.date);
    extract_entries(source, reconcile(rows), config)
}

/// Extract directives from reconciled rows.
pub fn extract_entries(
    source: &str,
    reconciled: Reconciled,
    config: &ImporterConfig,
) -> ImportResult {
    let Reconciled { rows, unbalanced } = reconciled;
    let mut result = ImportResult::new(
        rows.iter()
            .enumerate()
            .map(|(index, row)| transaction(source, index, row, config))
            .collect(),
    );

    let Some(last) = rows.last() else {
        return result;
    };

    if let Some(lineno) = unbalanced {
        warn!(source, lineno, "cannot reorder rows to agree with balance values");
        return result.with_warning(format!(
            "{source}:{lineno}: cannot reorder rows to agree with balance values"
        ));
    }

    match config.first_day {
        None => {
            if let Some(date) = last.date.succ_opt() {
                result
                    .directives
                    .push(balance(source, date, last.balance, config));
            }
        }
        Some(first_day) => {
            for (date, amount) in period_balances(&rows, first_day) {
                result.directives.push(balance(source, date, amount, config));
            }
        }
    }

    result
}

/// Balance assertions at period starts, most recent first.
///
/// Walking back from the period after the last row, each row that precedes
/// the current boundary is the last one known before it; its balance is
/// asserted there and the boundary moves one period back.
fn period_balances(rows: &[Row], first_day: FirstDay) -> Vec<(NaiveDate, Decimal)> {
    let mut balances = Vec::new();
    let Some(mut boundary) = rows
        .last()
        .and_then(|last| periods::greatest_start(last.date, first_day))
        .and_then(periods::next)
    else {
        return balances;
    };

    for row in rows.iter().rev() {
        if row.date < boundary {
            balances.push((boundary, row.balance));
            match periods::prev(boundary) {
                Some(prev) => boundary = prev,
                None => break,
            }
        }
    }
    balances
}

fn transaction(source: &str, index: usize, row: &Row, config: &ImporterConfig) -> Directive {
    // The position in balance order, not the file line, breaks ties when
    // directives are later sorted by date
    Directive::Transaction(
        Transaction::new(row.date, row.description.as_str())
            .with_meta(source_meta(source, index))
            .with_posting(Posting::new(
                config.account.as_str(),
                Amount::new(row.amount, config.currency.as_str()),
            )),
    )
}

fn balance(source: &str, date: NaiveDate, amount: Decimal, config: &ImporterConfig) -> Directive {
    // Balances sort before the day's transactions, so no tie-break is needed
    Directive::Balance(
        Balance::new(
            date,
            config.account.as_str(),
            Amount::new(amount, config.currency.as_str()),
        )
        .with_meta(source_meta(source, 0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanrec_core::MetaValue;
    use rust_decimal_macros::dec;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn row(lineno: usize, date: NaiveDate, amount: Decimal, balance: Decimal) -> Row {
        Row::new(lineno, date, format!("row {lineno}"), amount, balance)
    }

    fn config(first_day: Option<u32>) -> ImporterConfig {
        let mut builder = ImporterConfig::csv().account("Assets:Bank").currency("CAD");
        if let Some(day) = first_day {
            builder = builder.first_day(day);
        }
        builder.build().unwrap()
    }

    fn balances(result: &ImportResult) -> Vec<(NaiveDate, Decimal)> {
        result
            .directives
            .iter()
            .filter_map(Directive::as_balance)
            .map(|b| (b.date, b.amount.number))
            .collect()
    }

    #[test]
    fn test_single_trailing_balance() {
        let rows = vec![
            row(1, date(2024, 1, 10), dec!(100), dec!(100)),
            row(2, date(2024, 1, 11), dec!(50), dec!(150)),
            row(3, date(2024, 1, 12), dec!(-30), dec!(120)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(None));
        assert!(result.warnings.is_empty());
        assert_eq!(result.directives.len(), 4);
        assert_eq!(balances(&result), vec![(date(2024, 1, 13), dec!(120))]);
    }

    #[test]
    fn test_transactions_carry_position_as_lineno() {
        let rows = vec![
            row(9, date(2024, 1, 10), dec!(-5), dec!(5)),
            row(4, date(2024, 1, 10), dec!(10), dec!(10)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(None));
        let txns: Vec<_> = result
            .directives
            .iter()
            .filter_map(Directive::as_transaction)
            .collect();
        assert_eq!(txns[0].narration, "row 4");
        assert_eq!(txns[0].meta.get("lineno"), Some(&MetaValue::Number(dec!(0))));
        assert_eq!(txns[1].narration, "row 9");
        assert_eq!(txns[1].meta.get("lineno"), Some(&MetaValue::Number(dec!(1))));
        assert_eq!(
            txns[1].postings[0].amount(),
            Some(&Amount::new(dec!(-5), "CAD"))
        );
    }

    #[test]
    fn test_periodic_balances_one_per_period() {
        let rows = vec![
            row(1, date(2024, 1, 5), dec!(100), dec!(100)),
            row(2, date(2024, 1, 20), dec!(-40), dec!(60)),
            row(3, date(2024, 2, 3), dec!(15), dec!(75)),
            row(4, date(2024, 2, 25), dec!(5), dec!(80)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(Some(1)));
        assert_eq!(
            balances(&result),
            vec![(date(2024, 3, 1), dec!(80)), (date(2024, 2, 1), dec!(60))]
        );
    }

    #[test]
    fn test_periodic_balances_mid_month_anchor() {
        let rows = vec![
            row(1, date(2024, 3, 10), dec!(10), dec!(10)),
            row(2, date(2024, 3, 15), dec!(10), dec!(20)),
            row(3, date(2024, 4, 2), dec!(10), dec!(30)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(Some(15)));
        assert_eq!(
            balances(&result),
            vec![(date(2024, 4, 15), dec!(30)), (date(2024, 3, 15), dec!(10))]
        );
    }

    #[test]
    fn test_periodic_balances_skip_empty_period() {
        // Nothing happened in February; the January balance still holds on March 1st
        let rows = vec![
            row(1, date(2024, 1, 5), dec!(100), dec!(100)),
            row(2, date(2024, 3, 7), dec!(1), dec!(101)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(Some(1)));
        assert_eq!(
            balances(&result),
            vec![(date(2024, 4, 1), dec!(101)), (date(2024, 3, 1), dec!(100))]
        );
    }

    #[test]
    fn test_unbalanced_rows_get_no_assertions() {
        let rows = vec![
            row(1, date(2024, 1, 1), dec!(100), dec!(100)),
            row(2, date(2024, 1, 2), dec!(50), dec!(151)),
            row(3, date(2024, 1, 3), dec!(-30), dec!(121)),
        ];
        let result = extract_rows("stmt.csv", rows, &config(Some(1)));
        assert_eq!(result.directives.len(), 3);
        assert!(result.directives.iter().all(Directive::is_transaction));
        assert_eq!(
            result.warnings,
            vec!["stmt.csv:2: cannot reorder rows to agree with balance values".to_string()]
        );
    }

    #[test]
    fn test_no_rows_no_directives() {
        let result = extract_rows("stmt.csv", Vec::new(), &config(None));
        assert!(result.directives.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_single_row_gets_assertion() {
        let rows = vec![row(1, date(2024, 2, 29), dec!(7), dec!(42))];
        let result = extract_rows("stmt.csv", rows, &config(None));
        assert_eq!(balances(&result), vec![(date(2024, 3, 1), dec!(42))]);
    }
}
