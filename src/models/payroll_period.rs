//! Payroll period models.
//!
//! This module contains the [`PayrollPeriod`] type, the date window a payroll
//! run covers, together with its lock flag and the [`NewPayrollPeriod`] input
//! used when creating one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Audit;
use crate::error::{EngineError, EngineResult};

/// Identifier of a payroll period.
pub type PeriodId = i64;

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let june = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
/// );
/// assert_eq!(june.days().count(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range (inclusive).
    pub start: NaiveDate,
    /// Last day of the range (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` to `end`, both inclusive.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Checks if a given date falls within the range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates over every calendar day in the range.
    ///
    /// Yields nothing when `start` is after `end`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |day| *day <= self.end)
    }

    /// Returns true if the two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A payroll period.
///
/// The `locked` flag only ever moves from false to true, as the final effect
/// of a successful payroll run. Once locked, no payroll may be written for the
/// period and no attendance, overtime or reimbursement dated inside it may be
/// recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier for the period.
    pub id: PeriodId,
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Whether the period has been run and finalized.
    pub locked: bool,
    /// Audit fields.
    #[serde(flatten)]
    pub audit: Audit,
}

impl PayrollPeriod {
    /// Returns the period's dates as a [`DateRange`].
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Checks if a given date falls within this period (inclusive).
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{Audit, PayrollPeriod};
    /// use chrono::{NaiveDate, Utc};
    ///
    /// let period = PayrollPeriod {
    ///     id: 1,
    ///     start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    ///     locked: false,
    ///     audit: Audit::created_by("admin@example.com", Utc::now()),
    /// };
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }

    /// Fails with [`EngineError::InvalidPeriod`] if the start is after the end.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::InvalidPeriod {
                period_id: self.id,
                message: format!(
                    "start date {} is after end date {}",
                    self.start_date, self.end_date
                ),
            });
        }
        Ok(())
    }
}

/// Input for creating a new, unlocked payroll period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayrollPeriod {
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Email of the admin creating the period.
    pub created_by: String,
}

impl NewPayrollPeriod {
    /// Returns the requested dates as a [`DateRange`].
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}
