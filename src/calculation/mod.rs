//! Calculation logic for the Payroll Period Run Engine.
//!
//! This module contains the pure calculation functions of a payroll run:
//! day detection and workday counting, overtime pay, and the payslip
//! calculator that combines attendance salary, overtime and reimbursements.

mod overtime;
mod payslip;
mod workdays;

pub use overtime::{
    ASSUMED_WORKDAYS_PER_MONTH, OVERTIME_MULTIPLIER, OvertimeResult, calculate_overtime,
    salary_per_hour,
};
pub use payslip::{PayslipInputs, calculate_payslip, describe_payslip};
pub use workdays::{DayType, count_workdays, get_day_type};
