use exn::{OptionExt, ResultExt};
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::{Date, Month};

use crate::error::{ErrorKind, Result};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

const ISO_DATE: &[BorrowedFormatItem<'static>] = time::macros::format_description!("[year]-[month]-[day]");

/// Who borrowed a book, and when it's due back.
///
/// Serialized with the same field names the browser version kept in local
/// storage:
///
/// ```json
/// { "borrowerName": "Sam", "borrowDate": "2024-01-31", "returnDate": "2024-04-30" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub borrower_name: String,
    #[serde(with = "iso_date")]
    pub borrow_date: Date,
    #[serde(with = "iso_date")]
    pub return_date: Date,
}
impl BorrowRecord {
    /// Creates a record whose return date is `borrow_date` plus the loan
    /// period.
    pub fn new(borrower_name: impl Into<String>, borrow_date: Date, loan: LoanPeriod) -> Result<Self> {
        Ok(Self {
            borrower_name: borrower_name.into(),
            borrow_date,
            return_date: loan.due(borrow_date)?,
        })
    }
}

/// Length of a loan in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPeriod {
    months: u32,
}
impl LoanPeriod {
    pub const fn months(months: u32) -> Self {
        Self { months }
    }

    pub fn as_months(&self) -> u32 {
        self.months
    }

    /// The due date for a book borrowed on `borrowed`.
    ///
    /// Adds whole calendar months. When the target month is too short for
    /// the day of month, the due date is that month's last day.
    ///
    /// ```
    /// use shelfmark_lending::{LoanPeriod, parse_date};
    /// let due = LoanPeriod::default().due(parse_date("2024-01-31").unwrap()).unwrap();
    /// assert_eq!(shelfmark_lending::format_date(due), "2024-04-30");
    /// ```
    pub fn due(&self, borrowed: Date) -> Result<Date> {
        let zero_based = i64::from(borrowed.year()) * 12 + i64::from(u8::from(borrowed.month())) - 1 + i64::from(self.months);
        let year = i32::try_from(zero_based.div_euclid(12)).or_raise(|| ErrorKind::DateOutOfRange)?;
        let month = u8::try_from(zero_based.rem_euclid(12) + 1).ok().ok_or_raise(|| ErrorKind::DateOutOfRange)?;
        let month = Month::try_from(month).or_raise(|| ErrorKind::DateOutOfRange)?;
        let mut day = borrowed.day();
        loop {
            match Date::from_calendar_date(year, month, day) {
                Ok(due) => return Ok(due),
                Err(_) if day > 28 => day -= 1,
                Err(e) => return Err(e).or_raise(|| ErrorKind::DateOutOfRange),
            }
        }
    }
}
impl Default for LoanPeriod {
    fn default() -> Self {
        Self::months(3)
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date> {
    let value = value.trim();
    Date::parse(value, ISO_DATE)
        .or_raise(|| ErrorKind::InvalidDate(value.to_string()))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    // A date alone always has every component the description asks for.
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-29")]
    #[case("0999-01-05")]
    #[case("9999-12-31")]
    fn test_format_is_zero_padded_iso(#[case] value: &str) {
        assert_eq!(format_date(parse_date(value).unwrap()), value);
    }

    #[rstest]
    #[case("2024-01-15", "2024-04-15")]
    #[case("2024-01-31", "2024-04-30")]
    #[case("2023-11-30", "2024-02-29")]
    #[case("2022-11-30", "2023-02-28")]
    #[case("2024-10-01", "2025-01-01")]
    #[case("2024-12-31", "2025-03-31")]
    fn test_three_month_loan(#[case] borrowed: &str, #[case] due: &str) {
        let due_date = LoanPeriod::default().due(parse_date(borrowed).unwrap()).unwrap();
        assert_eq!(format_date(due_date), due);
    }

    #[rstest]
    #[case(0, "2024-05-31", "2024-05-31")]
    #[case(1, "2024-05-31", "2024-06-30")]
    #[case(12, "2024-02-29", "2025-02-28")]
    #[case(25, "2024-01-10", "2026-02-10")]
    fn test_other_periods(#[case] months: u32, #[case] borrowed: &str, #[case] due: &str) {
        let due_date = LoanPeriod::months(months).due(parse_date(borrowed).unwrap()).unwrap();
        assert_eq!(format_date(due_date), due);
    }

    #[rstest]
    #[case("")]
    #[case("tomorrow")]
    #[case("2024-02-30")]
    #[case("2024/01/01")]
    #[case("24-01-01")]
    fn test_invalid_dates(#[case] value: &str) {
        let err = parse_date(value).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidDate(_)));
    }

    #[test]
    fn test_record_json_shape() {
        let record = BorrowRecord::new("Sam", parse_date("2024-01-31").unwrap(), LoanPeriod::default()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "borrowerName": "Sam",
                "borrowDate": "2024-01-31",
                "returnDate": "2024-04-30",
            })
        );
        let back: BorrowRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_due_date_out_of_range() {
        let borrowed = parse_date("9999-12-01").unwrap();
        assert!(LoanPeriod::default().due(borrowed).is_err());
    }
}
