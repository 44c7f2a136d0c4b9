//! Calendar month helpers shared by budgets and the dashboard.

use time::{Date, Month};

use crate::Error;

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range.
    pub start: Date,
    /// The last day in the range.
    pub end: Date,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// The first and last day of `month` in `year`.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `year` is outside the range of supported dates.
pub fn month_bounds(year: i32, month: Month) -> Result<DateRange, Error> {
    Ok(DateRange {
        start: calendar_date(year, month, 1)?,
        end: end_of_month(year, month)?,
    })
}

/// The last day of `month` in `year`.
///
/// # Errors
/// Returns an [Error::InvalidInput] if `year` is outside the range of supported dates.
pub fn end_of_month(year: i32, month: Month) -> Result<Date, Error> {
    calendar_date(year, month, last_day_of_month(year, month))
}

/// Move `offset` months forwards (or backwards when negative) from `month` in `year`.
pub fn shift_month(year: i32, month: Month, offset: i32) -> (i32, Month) {
    let month_index = year * 12 + i32::from(u8::from(month)) - 1 + offset;
    // `rem_euclid` keeps the index in 0..12.
    let shifted_month = Month::January.nth_next(month_index.rem_euclid(12) as u8);

    (month_index.div_euclid(12), shifted_month)
}

fn calendar_date(year: i32, month: Month, day: u8) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, day)
        .map_err(|error| Error::InvalidInput(format!("{year}-{month} is not a valid month: {error}")))
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
