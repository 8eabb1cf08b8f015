//! Core data models for the Payroll Period Run Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod employee;
mod payroll_period;
mod payslip;
mod records;

pub use audit::Audit;
pub use employee::{Employee, EmployeeId};
pub use payroll_period::{DateRange, NewPayrollPeriod, PayrollPeriod, PeriodId};
pub use payslip::{
    EmployeePayrollSummary, NewPayroll, OvertimeRecap, Payroll, PayrollId, PayrollSummary, Payslip,
};
pub use records::{
    AttendanceRecord, MAX_OVERTIME_HOURS_PER_DAY, OvertimeRecord, ReimbursementRecord,
};
