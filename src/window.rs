//! Calendar months and the two-month update window.

use std::fmt;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A calendar month, stored as its first day.
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(YearMonth)
            .ok_or_else(|| anyhow!("{}-{:02} is not a valid month", year, month))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Two-digit month, the key of the month cache directory.
    pub fn mm(&self) -> String {
        format!("{:02}", self.month())
    }

    pub fn previous(&self) -> Self {
        YearMonth(self.0 - Months::new(1))
    }

    pub fn next(&self) -> Self {
        YearMonth(self.0 + Months::new(1))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().0 - Days::new(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The previous and current month refreshed by one run.
pub struct UpdateWindow {
    pub last_month: YearMonth,
    pub this_month: YearMonth,
}

impl UpdateWindow {
    pub fn ending(this_month: YearMonth) -> Self {
        UpdateWindow {
            last_month: this_month.previous(),
            this_month,
        }
    }

    /// A window whose previous month is January or February of the same
    /// year. Its update covers the whole year so far, so nothing from the
    /// existing store needs to be kept.
    pub fn is_early_year(&self) -> bool {
        self.last_month.year() == self.this_month.year() && self.last_month.month() <= 2
    }

    /// Month caches the assembler reads for this window.
    pub fn assembly_months(&self) -> Vec<YearMonth> {
        if self.is_early_year() {
            months_through(self.this_month)
        } else {
            vec![self.last_month, self.this_month]
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.last_month.first_day()
    }

    pub fn end(&self) -> NaiveDate {
        self.this_month.last_day()
    }

    /// Calendar years touched by the window, oldest first.
    pub fn years(&self) -> Vec<i32> {
        let mut years = vec![self.last_month.year()];
        if self.this_month.year() != self.last_month.year() {
            years.push(self.this_month.year());
        }
        years
    }
}

/// January through `last`, inclusive, in the same year.
pub fn months_through(last: YearMonth) -> Vec<YearMonth> {
    (1..=last.month())
        .filter_map(|m| YearMonth::new(last.year(), m).ok())
        .collect()
}

// -- Tests -------------------------------------------------------------------
