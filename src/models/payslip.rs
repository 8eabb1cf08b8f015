//! Payslip and payroll models.
//!
//! This module contains the [`Payslip`] computed for one employee in one
//! period, the [`Payroll`] row that owns it once persisted, and the summary
//! projections read back out of persisted payrolls.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Audit, EmployeeId, PeriodId, ReimbursementRecord};

/// Identifier of a persisted payroll row.
pub type PayrollId = i64;

/// One overtime entry as paid out on a payslip.
///
/// # Example
///
/// ```
/// use payroll_engine::models::OvertimeRecap;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let recap = OvertimeRecap {
///     date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
///     hours: Decimal::new(2, 0),
///     amount: Decimal::new(420_000, 0),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRecap {
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Hours of overtime.
    pub hours: Decimal,
    /// Amount paid for these hours.
    pub amount: Decimal,
}

/// The derived breakdown of one employee's compensation for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// The employee the payslip is for.
    pub employee_id: EmployeeId,
    /// The period the payslip covers.
    pub period_id: PeriodId,
    /// Days the employee attended in the period.
    pub attendance_count: u32,
    /// Weekdays in the period.
    pub total_workdays: u32,
    /// Salary earned through attendance.
    pub attendance_salary: Decimal,
    /// Hourly rate used for overtime.
    pub salary_per_hour: Decimal,
    /// Every overtime entry with its computed amount.
    pub overtime_recap: Vec<OvertimeRecap>,
    /// Sum of overtime hours.
    pub overtime_total_hours: Decimal,
    /// Sum of overtime amounts.
    pub overtime_salary: Decimal,
    /// Reimbursements paid in the period.
    pub reimbursements: Vec<ReimbursementRecord>,
    /// Sum of reimbursement amounts.
    pub reimbursement_total: Decimal,
    /// Attendance salary plus overtime plus reimbursements.
    pub total_salary: Decimal,
    /// Human-readable breakdown of the figures above.
    pub description: String,
}

/// A payroll row ready to be written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayroll {
    /// The employee paid.
    pub employee_id: EmployeeId,
    /// The period paid for.
    pub period_id: PeriodId,
    /// The computed payslip.
    pub payslip: Payslip,
    /// Email of the admin who triggered the run.
    pub created_by: String,
}

/// A persisted payroll row: one per (employee, period) pair.
///
/// Payroll rows are only created by a successful run and are never updated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payroll {
    /// Unique identifier for the row.
    pub id: PayrollId,
    /// The employee paid.
    pub employee_id: EmployeeId,
    /// The period paid for.
    pub period_id: PeriodId,
    /// The computed payslip.
    pub payslip: Payslip,
    /// Audit fields.
    #[serde(flatten)]
    pub audit: Audit,
}

/// One employee's line in a [`PayrollSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayrollSummary {
    /// The employee paid.
    pub employee_id: EmployeeId,
    /// The employee's display name.
    pub employee_name: String,
    /// The employee's total salary for the period.
    pub total_salary: Decimal,
}

/// Totals across every payroll of a period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeePayrollSummary, PayrollSummary};
/// use rust_decimal::Decimal;
///
/// let summary = PayrollSummary {
///     period_id: 1,
///     employees: vec![EmployeePayrollSummary {
///         employee_id: 1,
///         employee_name: "Ayu".to_string(),
///         total_salary: Decimal::new(2_470_000, 0),
///     }],
///     total_salary: Decimal::new(2_470_000, 0),
/// };
/// assert_eq!(summary.employees.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The summarized period.
    pub period_id: PeriodId,
    /// One line per paid employee.
    pub employees: Vec<EmployeePayrollSummary>,
    /// Sum of every employee's total salary.
    pub total_salary: Decimal,
}
