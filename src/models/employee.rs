//! Employee model.
//!
//! This module defines the Employee struct as seen by the payroll run:
//! an identifier, contact details and a monthly base salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Audit;

/// Identifier of an employee.
pub type EmployeeId = i64;

/// Represents an employee on the payroll roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// The employee's display name.
    pub name: String,
    /// The employee's email address.
    pub email: String,
    /// Monthly base salary, currency agnostic.
    pub salary: Decimal,
    /// Audit fields.
    #[serde(flatten)]
    pub audit: Audit,
}
