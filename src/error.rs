//! Error types for the Payroll Period Run Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every way a payroll run, a payroll read, or configuration loading
//! can fail.

use thiserror::Error;

use crate::models::{EmployeeId, PeriodId};

/// The main error type for the Payroll Period Run Engine.
///
/// Every stage of a run fails fast with one of these variants and the error
/// is surfaced verbatim to the caller. A failed run leaves the period
/// unlocked with no payroll rows written, so the caller may retry it.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::PeriodLocked { period_id: 7 };
/// assert_eq!(error.to_string(), "Payroll period 7 is locked");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// No payroll period matched the requested identifier or date.
    #[error("Payroll period not found: {lookup}")]
    PeriodNotFound {
        /// Description of the lookup that failed (an id or a date).
        lookup: String,
    },

    /// The payroll period has already been run and locked.
    #[error("Payroll period {period_id} is locked")]
    PeriodLocked {
        /// The locked period.
        period_id: PeriodId,
    },

    /// The employee roster is empty.
    #[error("No employees found for payroll period {period_id}")]
    NoEmployeesFound {
        /// The period being run.
        period_id: PeriodId,
    },

    /// The period cannot be used for a payroll calculation.
    #[error("Invalid payroll period {period_id}: {message}")]
    InvalidPeriod {
        /// The offending period.
        period_id: PeriodId,
        /// What made the period invalid.
        message: String,
    },

    /// A source record violated its constraints.
    #[error("Invalid record for employee {employee_id}: {message}")]
    InvalidRecord {
        /// The employee the record belongs to.
        employee_id: EmployeeId,
        /// What made the record invalid.
        message: String,
    },

    /// The run was requested without an actor to attribute it to.
    #[error("Invalid actor: {message}")]
    InvalidActor {
        /// What made the actor invalid.
        message: String,
    },

    /// One of the data sources failed while aggregating period inputs.
    #[error("Failed to aggregate {source_name}: {message}")]
    AggregationFailure {
        /// The data source that failed (e.g. "attendance").
        source_name: String,
        /// The underlying failure.
        message: String,
    },

    /// Writing payroll rows or locking the period failed.
    #[error("Failed to persist payroll period {period_id}: {message}")]
    PersistenceFailure {
        /// The period being persisted.
        period_id: PeriodId,
        /// The underlying failure.
        message: String,
    },

    /// A summary was requested for a period that has no payrolls.
    #[error("No payrolls found for payroll period {period_id}")]
    NoPayrollsFound {
        /// The requested period.
        period_id: PeriodId,
    },

    /// No payslip exists for the employee in the period.
    #[error("Payslip not found for employee {employee_id} in payroll period {period_id}")]
    PayslipNotFound {
        /// The requested employee.
        employee_id: EmployeeId,
        /// The requested period.
        period_id: PeriodId,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
