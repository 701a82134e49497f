//! Date helpers for statement parsers.

use chrono::{Datelike, Days, NaiveDate};

/// Month names and numerals recognized by [`month_number`].
static MONTHS: [(&str, u32); 45] = [
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
    ("1", 1),
    ("2", 2),
    ("3", 3),
    ("4", 4),
    ("5", 5),
    ("6", 6),
    ("7", 7),
    ("8", 8),
    ("9", 9),
    ("10", 10),
    ("11", 11),
    ("12", 12),
    ("01", 1),
    ("02", 2),
    ("03", 3),
    ("04", 4),
    ("05", 5),
    ("06", 6),
    ("07", 7),
    ("08", 8),
    ("09", 9),
];

/// Turn a month name into its number in `[1, 12]`.
///
/// Accepts full and three-letter English names in any case, and month
/// numbers with or without a leading zero.
pub fn month_number(month: &str) -> Option<u32> {
    let month = month.trim();
    MONTHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(month))
        .map(|&(_, number)| number)
}

/// Add `biz_days` business days to `date`.
///
/// A date falling on a weekend first moves to the following Monday.
pub fn add_biz_days(date: NaiveDate, biz_days: u32) -> Option<NaiveDate> {
    let weeks = biz_days / 5;
    let left = biz_days % 5;
    let mut days = u64::from(weeks) * 7 + u64::from(left);

    let mut weekday = date.weekday().num_days_from_monday();
    if weekday >= 5 {
        days += u64::from(7 - weekday);
        weekday = 0;
    }
    // The remainder crosses a weekend
    if weekday + left >= 5 {
        days += 2;
    }
    date.checked_add_days(Days::new(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number("SEPTEMBER"), Some(9));
        assert_eq!(month_number("dec"), Some(12));
        assert_eq!(month_number("7"), Some(7));
        assert_eq!(month_number("07"), Some(7));
        assert_eq!(month_number(" 12 "), Some(12));
        assert_eq!(month_number("13"), None);
        assert_eq!(month_number("Sept"), None);
        assert_eq!(month_number(""), None);
    }

    #[test]
    fn test_add_biz_days_within_week() {
        // 2024-01-01 is a Monday
        assert_eq!(add_biz_days(date(2024, 1, 1), 0), Some(date(2024, 1, 1)));
        assert_eq!(add_biz_days(date(2024, 1, 1), 4), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_add_biz_days_across_weekend() {
        // Friday + 1 business day is Monday
        assert_eq!(add_biz_days(date(2024, 1, 5), 1), Some(date(2024, 1, 8)));
        assert_eq!(add_biz_days(date(2024, 1, 3), 5), Some(date(2024, 1, 10)));
        assert_eq!(add_biz_days(date(2024, 1, 4), 7), Some(date(2024, 1, 15)));
    }

    #[test]
    fn test_add_biz_days_from_weekend() {
        // Saturday and Sunday start from Monday
        assert_eq!(add_biz_days(date(2024, 1, 6), 0), Some(date(2024, 1, 8)));
        assert_eq!(add_biz_days(date(2024, 1, 7), 1), Some(date(2024, 1, 9)));
    }
}
