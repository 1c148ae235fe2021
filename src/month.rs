//! Month selection (`YYYY-MM`) shared by the dashboard, expense, and budget
//! pages.

use std::fmt::Display;

use time::{Date, Month};

use crate::{Error, timezone};

/// A calendar month, the unit every page filters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Parse the `YYYY-MM` form used in query strings, e.g. "2025-08".
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the string does not match the format
    /// or names a month outside 1-12.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let (year, month_number) = sscanf::sscanf!(raw, "{i32}-{u8}")
            .ok_or_else(|| Error::InvalidMonth(raw.to_string()))?;

        let month = Month::try_from(month_number)
            .map_err(|_| Error::InvalidMonth(raw.to_string()))?;

        Ok(Self { year, month })
    }

    /// The current month in the given canonical timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the timezone name is unknown.
    pub fn current(canonical_timezone: &str) -> Result<Self, Error> {
        let today = timezone::local_date(canonical_timezone)?;

        Ok(Self {
            year: today.year(),
            month: today.month(),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1).expect("day 1 exists in every month")
    }

    /// The last day of the month, leap years included.
    pub fn last_day(&self) -> Date {
        let last = last_day_of_month(self.year, self.month);

        Date::from_calendar_date(self.year, self.month, last)
            .expect("computed last day exists in its month")
    }

    pub fn previous(&self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    pub fn next(&self) -> Self {
        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.next(),
        }
    }

    /// The heading shown above month-filtered pages, e.g. "August 2025".
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
