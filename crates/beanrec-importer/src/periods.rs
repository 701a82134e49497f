//! Monthly billing periods.
//!
//! A statement period starts on the same day of every month, its
//! [`FirstDay`], and ends the day before the next start. The first day is
//! capped at 28 so that every month has one.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors for period arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The first day of a period must exist in every month.
    #[error("invalid first day of period {0}: must be in [1, 28]")]
    InvalidFirstDay(u32),
}

/// The day of the month a billing period starts on, in `[1, 28]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FirstDay(u32);

impl FirstDay {
    /// Validate a first day of period.
    pub const fn new(day: u32) -> Result<Self, PeriodError> {
        if matches!(day, 1..=28) {
            Ok(Self(day))
        } else {
            Err(PeriodError::InvalidFirstDay(day))
        }
    }

    /// The day of the month.
    pub const fn day(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for FirstDay {
    type Error = PeriodError;

    fn try_from(day: u32) -> Result<Self, Self::Error> {
        Self::new(day)
    }
}

impl From<FirstDay> for u32 {
    fn from(first_day: FirstDay) -> Self {
        first_day.0
    }
}

impl fmt::Display for FirstDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The start of the period containing `date`.
///
/// Returns `None` only at the edges of the representable calendar.
pub fn greatest_start(date: NaiveDate, first_day: FirstDay) -> Option<NaiveDate> {
    let start = date.with_day(first_day.day())?;
    if start <= date {
        Some(start)
    } else {
        prev(start)
    }
}

/// The end of the period containing `date`.
pub fn lowest_end(date: NaiveDate, first_day: FirstDay) -> Option<NaiveDate> {
    next(greatest_start(date, first_day)?)?.pred_opt()
}

/// The same day of the following month.
///
/// Only meaningful for days up to 28; later days are clamped by the month
/// length.
pub fn next(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(1))
}

/// The same day of the previous month.
pub fn prev(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(1))
}
