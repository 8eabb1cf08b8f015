//! Day detection and workday counting.
//!
//! This module classifies calendar days as weekdays or weekend days and
//! counts the workdays in a payroll period. A workday is any day that is not
//! a Saturday or a Sunday; public holidays are not taken into account.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::DateRange;

/// Represents the type of a calendar day.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::DayType;
///
/// let day_type = DayType::Saturday;
/// assert_eq!(format!("{:?}", day_type), "Saturday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl DayType {
    /// Returns true for Monday through Friday.
    pub fn is_workday(self) -> bool {
        self == DayType::Weekday
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
        }
    }
}

/// Determines the day type for a given date.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{get_day_type, DayType};
/// use chrono::NaiveDate;
///
/// // 2024-06-01 is a Saturday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()), DayType::Saturday);
/// // 2024-06-02 is a Sunday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()), DayType::Sunday);
/// // 2024-06-03 is a Monday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()), DayType::Weekday);
/// ```
pub fn get_day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Counts the workdays in an inclusive date range.
///
/// Returns zero for a range with no weekdays, including a reversed range.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_workdays;
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let june = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
/// );
/// assert_eq!(count_workdays(&june), 20);
/// ```
pub fn count_workdays(range: &DateRange) -> u32 {
    range
        .days()
        .filter(|day| get_day_type(*day).is_workday())
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monday_is_weekday() {
        assert_eq!(get_day_type(date(2024, 6, 3)), DayType::Weekday);
    }

    #[test]
    fn test_friday_is_weekday() {
        assert_eq!(get_day_type(date(2024, 6, 7)), DayType::Weekday);
    }

    #[test]
    fn test_saturday_is_saturday() {
        assert_eq!(get_day_type(date(2024, 6, 8)), DayType::Saturday);
    }

    #[test]
    fn test_sunday_is_sunday() {
        assert_eq!(get_day_type(date(2024, 6, 9)), DayType::Sunday);
    }

    #[test]
    fn test_june_2024_has_20_workdays() {
        // June 2024 starts on a Saturday and ends on a Sunday.
        let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30));
        assert_eq!(count_workdays(&range), 20);
    }

    #[test]
    fn test_july_2024_has_23_workdays() {
        let range = DateRange::new(date(2024, 7, 1), date(2024, 7, 31));
        assert_eq!(count_workdays(&range), 23);
    }

    #[test]
    fn test_full_week_has_5_workdays() {
        let range = DateRange::new(date(2024, 6, 3), date(2024, 6, 9));
        assert_eq!(count_workdays(&range), 5);
    }

    #[test]
    fn test_weekend_only_has_no_workdays() {
        let range = DateRange::new(date(2024, 6, 8), date(2024, 6, 9));
        assert_eq!(count_workdays(&range), 0);
    }

    #[test]
    fn test_single_weekday_has_one_workday() {
        let range = DateRange::new(date(2024, 6, 5), date(2024, 6, 5));
        assert_eq!(count_workdays(&range), 1);
    }

    #[test]
    fn test_reversed_range_has_no_workdays() {
        let range = DateRange::new(date(2024, 6, 10), date(2024, 6, 3));
        assert_eq!(count_workdays(&range), 0);
    }

    #[test]
    fn test_day_type_display() {
        assert_eq!(DayType::Weekday.to_string(), "Weekday");
        assert_eq!(DayType::Sunday.to_string(), "Sunday");
    }
}
