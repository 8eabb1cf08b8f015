//! Payslip calculation.
//!
//! This module turns one employee's aggregated period inputs into a
//! [`Payslip`]. The calculation is pure: it performs no I/O and the same
//! inputs always produce the same payslip, description included.

use rust_decimal::Decimal;

use super::overtime::{OVERTIME_MULTIPLIER, calculate_overtime, overflow, salary_per_hour};
use super::workdays::count_workdays;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, OvertimeRecord, PayrollPeriod, Payslip, ReimbursementRecord};

/// One employee's aggregated inputs for a period.
///
/// Absent data is represented as zero attendance and empty slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayslipInputs<'a> {
    /// Days the employee attended in the period.
    pub attendance_count: u32,
    /// Overtime entries dated inside the period.
    pub overtime: &'a [OvertimeRecord],
    /// Reimbursements dated inside the period.
    pub reimbursements: &'a [ReimbursementRecord],
}

/// Calculates an employee's payslip for a period.
///
/// With monthly salary `S`, workdays `W` and attendance `A`:
///
/// - attendance salary is `S * A / W`
/// - each overtime entry of `h` hours pays `h * (S / 20) * 2`
/// - reimbursements are paid at face value
/// - the total is the sum of the three
///
/// # Errors
///
/// - [`EngineError::InvalidPeriod`] if the period has no workdays
/// - [`EngineError::InvalidRecord`] if an overtime entry or reimbursement
///   violates its constraints, or if an amount exceeds the decimal range
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{calculate_payslip, PayslipInputs};
/// use payroll_engine::models::{Audit, Employee, OvertimeRecord, PayrollPeriod, ReimbursementRecord};
/// use chrono::{NaiveDate, Utc};
/// use rust_decimal::Decimal;
///
/// let employee = Employee {
///     id: 1,
///     name: "Ayu".to_string(),
///     email: "ayu@example.com".to_string(),
///     salary: Decimal::new(2_100_000, 0),
///     audit: Audit::created_by("seed", Utc::now()),
/// };
/// // 2024-07-01 (Monday) through 2024-07-29 (Monday) has 21 workdays.
/// let period = PayrollPeriod {
///     id: 1,
///     start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 7, 29).unwrap(),
///     locked: false,
///     audit: Audit::created_by("admin", Utc::now()),
/// };
/// let overtime = vec![OvertimeRecord {
///     employee_id: 1,
///     date: NaiveDate::from_ymd_opt(2024, 7, 3).unwrap(),
///     hours: Decimal::new(2, 0),
/// }];
/// let reimbursements = vec![ReimbursementRecord {
///     employee_id: 1,
///     date: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
///     amount: Decimal::new(50_000, 0),
///     description: "Taxi".to_string(),
/// }];
///
/// let inputs = PayslipInputs {
///     attendance_count: 20,
///     overtime: &overtime,
///     reimbursements: &reimbursements,
/// };
/// let payslip = calculate_payslip(&employee, inputs, &period).unwrap();
///
/// assert_eq!(payslip.total_workdays, 21);
/// assert_eq!(payslip.attendance_salary, Decimal::new(2_000_000, 0));
/// assert_eq!(payslip.overtime_salary, Decimal::new(420_000, 0));
/// assert_eq!(payslip.total_salary, Decimal::new(2_470_000, 0));
/// ```
pub fn calculate_payslip(
    employee: &Employee,
    inputs: PayslipInputs<'_>,
    period: &PayrollPeriod,
) -> EngineResult<Payslip> {
    let total_workdays = count_workdays(&period.range());
    if total_workdays == 0 {
        return Err(EngineError::InvalidPeriod {
            period_id: period.id,
            message: format!("no workdays between {} and {}", period.start_date, period.end_date),
        });
    }

    let attendance_salary = employee
        .salary
        .checked_mul(Decimal::from(inputs.attendance_count))
        .and_then(|earned| earned.checked_div(Decimal::from(total_workdays)))
        .ok_or_else(|| overflow(employee.id, "attendance salary"))?;

    let hourly_rate = salary_per_hour(employee.salary);
    let overtime = calculate_overtime(inputs.overtime, hourly_rate)?;

    let mut reimbursement_total = Decimal::ZERO;
    for reimbursement in inputs.reimbursements {
        reimbursement.validate()?;
        reimbursement_total = reimbursement_total
            .checked_add(reimbursement.amount)
            .ok_or_else(|| overflow(employee.id, "reimbursement total"))?;
    }

    let total_salary = attendance_salary
        .checked_add(overtime.total_amount)
        .and_then(|sum| sum.checked_add(reimbursement_total))
        .ok_or_else(|| overflow(employee.id, "total salary"))?;

    let mut payslip = Payslip {
        employee_id: employee.id,
        period_id: period.id,
        attendance_count: inputs.attendance_count,
        total_workdays,
        attendance_salary,
        salary_per_hour: hourly_rate,
        overtime_recap: overtime.recap,
        overtime_total_hours: overtime.total_hours,
        overtime_salary: overtime.total_amount,
        reimbursements: inputs.reimbursements.to_vec(),
        reimbursement_total,
        total_salary,
        description: String::new(),
    };
    payslip.description = describe_payslip(&payslip, employee.salary);

    Ok(payslip)
}

/// Renders the human-readable breakdown stored on a payslip.
pub fn describe_payslip(payslip: &Payslip, base_salary: Decimal) -> String {
    format!(
        "Total Salary: {:.2}\n\
         Attendance Salary: {:.2} (Base Salary: {:.2} x Attendance: {} / Workdays: {})\n\
         Overtime Salary: {:.2} (Overtime Hours: {} x Salary/Hour: {:.2} x {})\n\
         Total Reimbursement: {:.2}",
        payslip.total_salary,
        payslip.attendance_salary,
        base_salary,
        payslip.attendance_count,
        payslip.total_workdays,
        payslip.overtime_salary,
        payslip.overtime_total_hours.normalize(),
        payslip.salary_per_hour,
        OVERTIME_MULTIPLIER,
        payslip.reimbursement_total,
    )
}
