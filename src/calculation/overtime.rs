//! Overtime pay calculation.
//!
//! Overtime is paid per entry at double the employee's hourly rate, where
//! the hourly rate is the monthly salary over a fixed 20 working days.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeId, OvertimeRecap, OvertimeRecord};

/// Multiplier applied to the hourly rate for every overtime hour.
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Working days per month assumed when deriving the hourly overtime rate.
///
/// Independent of the period's actual workday count.
pub const ASSUMED_WORKDAYS_PER_MONTH: u32 = 20;

/// Returns the hourly rate used for overtime: the monthly salary over a
/// fixed 20 working days.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::salary_per_hour;
/// use rust_decimal::Decimal;
///
/// assert_eq!(salary_per_hour(Decimal::new(2_100_000, 0)), Decimal::new(105_000, 0));
/// ```
pub fn salary_per_hour(monthly_salary: Decimal) -> Decimal {
    monthly_salary / Decimal::from(ASSUMED_WORKDAYS_PER_MONTH)
}

pub(super) fn overflow(employee_id: EmployeeId, what: &str) -> EngineError {
    EngineError::InvalidRecord {
        employee_id,
        message: format!("{} overflows", what),
    }
}

/// The result of paying out a list of overtime entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeResult {
    /// One recap line per overtime entry, in input order.
    pub recap: Vec<OvertimeRecap>,
    /// Sum of hours across all entries.
    pub total_hours: Decimal,
    /// Sum of amounts across all entries.
    pub total_amount: Decimal,
}

/// Pays out overtime entries at `salary_per_hour * 2` per hour.
///
/// Every record is validated first; a record outside (0, 3] hours fails
/// the whole calculation with `InvalidRecord`, as does an amount too large
/// to represent.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_overtime;
/// use payroll_engine::models::OvertimeRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let records = vec![OvertimeRecord {
///     employee_id: 1,
///     date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
///     hours: Decimal::new(2, 0),
/// }];
///
/// let result = calculate_overtime(&records, Decimal::new(105_000, 0)).unwrap();
/// assert_eq!(result.total_amount, Decimal::new(420_000, 0));
/// assert_eq!(result.total_hours, Decimal::new(2, 0));
/// ```
pub fn calculate_overtime(
    records: &[OvertimeRecord],
    salary_per_hour: Decimal,
) -> EngineResult<OvertimeResult> {
    let mut recap = Vec::with_capacity(records.len());
    let mut total_hours = Decimal::ZERO;
    let mut total_amount = Decimal::ZERO;

    for record in records {
        record.validate()?;

        let amount = record
            .hours
            .checked_mul(salary_per_hour)
            .and_then(|pay| pay.checked_mul(OVERTIME_MULTIPLIER))
            .ok_or_else(|| overflow(record.employee_id, "overtime amount"))?;
        total_hours = total_hours
            .checked_add(record.hours)
            .ok_or_else(|| overflow(record.employee_id, "overtime hours"))?;
        total_amount = total_amount
            .checked_add(amount)
            .ok_or_else(|| overflow(record.employee_id, "overtime salary"))?;
        recap.push(OvertimeRecap {
            date: record.date,
            hours: record.hours,
            amount,
        });
    }

    Ok(OvertimeResult {
        recap,
        total_hours,
        total_amount,
    })
}
