//! Source records consumed by a payroll run.
//!
//! Attendance, overtime and reimbursement records are immutable once
//! recorded. Each carries the employee it belongs to and the calendar date it
//! applies to, which is what places it inside a payroll period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EmployeeId;
use crate::error::{EngineError, EngineResult};

/// Maximum overtime hours an employee may claim for a single day.
pub const MAX_OVERTIME_HOURS_PER_DAY: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// A day an employee was present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee who attended.
    pub employee_id: EmployeeId,
    /// The day attended.
    pub date: NaiveDate,
}

/// Overtime hours worked by an employee on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRecord {
    /// The employee who worked the overtime.
    pub employee_id: EmployeeId,
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours of overtime, in (0, 3].
    pub hours: Decimal,
}

impl OvertimeRecord {
    /// Creates an overtime record, rejecting hours outside (0, 3].
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::OvertimeRecord;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    /// assert!(OvertimeRecord::new(1, date, Decimal::new(2, 0)).is_ok());
    /// assert!(OvertimeRecord::new(1, date, Decimal::new(4, 0)).is_err());
    /// assert!(OvertimeRecord::new(1, date, Decimal::ZERO).is_err());
    /// ```
    pub fn new(employee_id: EmployeeId, date: NaiveDate, hours: Decimal) -> EngineResult<Self> {
        let record = Self {
            employee_id,
            date,
            hours,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the hours constraint.
    pub fn validate(&self) -> EngineResult<()> {
        if self.hours <= Decimal::ZERO {
            return Err(EngineError::InvalidRecord {
                employee_id: self.employee_id,
                message: format!(
                    "overtime on {} must be a positive number of hours, got {}",
                    self.date, self.hours
                ),
            });
        }
        if self.hours > MAX_OVERTIME_HOURS_PER_DAY {
            return Err(EngineError::InvalidRecord {
                employee_id: self.employee_id,
                message: format!(
                    "overtime on {} cannot exceed {} hours, got {}",
                    self.date, MAX_OVERTIME_HOURS_PER_DAY, self.hours
                ),
            });
        }
        Ok(())
    }
}

/// An expense an employee is reimbursed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementRecord {
    /// The employee to reimburse.
    pub employee_id: EmployeeId,
    /// The day the expense was claimed.
    pub date: NaiveDate,
    /// Amount to reimburse, strictly positive.
    pub amount: Decimal,
    /// What the expense was for.
    #[serde(default)]
    pub description: String,
}

impl ReimbursementRecord {
    /// Creates a reimbursement record, rejecting non-positive amounts.
    pub fn new(
        employee_id: EmployeeId,
        date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
    ) -> EngineResult<Self> {
        let record = Self {
            employee_id,
            date,
            amount,
            description: description.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks the amount constraint.
    pub fn validate(&self) -> EngineResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(EngineError::InvalidRecord {
                employee_id: self.employee_id,
                message: format!(
                    "reimbursement on {} must be a positive amount, got {}",
                    self.date, self.amount
                ),
            });
        }
        Ok(())
    }
}
