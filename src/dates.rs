//! Month windows bounding the date range of one sitemap run.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Days, Local, Months, NaiveDate};

/// A calendar month, resolved to the inclusive `[from_date, to_date]` range
/// the article API is queried with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthWindow {
    first: NaiveDate,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("invalid year/month: {} {}", year, month))?;
        Ok(MonthWindow { first })
    }

    /// The month containing today.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        MonthWindow {
            first: today - Days::new(today.day() as u64 - 1),
        }
    }

    /// The previous full calendar month.
    pub fn previous() -> Self {
        let today = Local::now().date_naive();
        let last_of_previous = today - Days::new(today.day() as u64);
        MonthWindow {
            first: last_of_previous - Days::new(last_of_previous.day() as u64 - 1),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// First day of the month as `YYYY-MM-DD`.
    pub fn from_date(&self) -> String {
        self.first.format("%Y-%m-%d").to_string()
    }

    /// Last day of the month as `YYYY-MM-DD`, computed by rolling to the
    /// first of the next month and subtracting one day.
    pub fn to_date(&self) -> String {
        let last = self.first + Months::new(1) - Days::new(1);
        last.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_date_is_first_of_month() {
        let window = MonthWindow::new(2025, 6).unwrap();
        assert_eq!(window.from_date(), "2025-06-01");
    }

    #[test]
    fn test_to_date_leap_february() {
        let window = MonthWindow::new(2024, 2).unwrap();
        assert_eq!(window.to_date(), "2024-02-29");
    }

    #[test]
    fn test_to_date_non_leap_february() {
        let window = MonthWindow::new(2023, 2).unwrap();
        assert_eq!(window.to_date(), "2023-02-28");
    }

    #[test]
    fn test_to_date_thirty_and_thirty_one_day_months() {
        assert_eq!(MonthWindow::new(2025, 4).unwrap().to_date(), "2025-04-30");
        assert_eq!(MonthWindow::new(2025, 7).unwrap().to_date(), "2025-07-31");
    }

    #[test]
    fn test_to_date_december_rolls_into_next_year() {
        let window = MonthWindow::new(2025, 12).unwrap();
        assert_eq!(window.to_date(), "2025-12-31");
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(MonthWindow::new(2025, 0).is_err());
        assert!(MonthWindow::new(2025, 13).is_err());
    }

    #[test]
    fn test_year_month_accessors() {
        let window = MonthWindow::new(2024, 2).unwrap();
        assert_eq!(window.year(), 2024);
        assert_eq!(window.month(), 2);
    }
}
