//! Storage ports and adapters for the Payroll Period Run Engine.
//!
//! The engine only talks to storage through the traits in this module. Two
//! adapters implement all of them:
//!
//! - [`InMemoryStore`]: lock-guarded maps, for tests and embedding
//! - [`SqliteStore`]: `sqlx` over SQLite
//!
//! # Example
//!
//! ```
//! use payroll_engine::storage::{InMemoryStore, PayrollSources};
//!
//! let sources = PayrollSources::from_store(InMemoryStore::new());
//! # let _ = sources;
//! ```

mod memory;
mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{
    DateRange, Employee, EmployeeId, NewPayroll, NewPayrollPeriod, OvertimeRecord, Payroll,
    PayrollPeriod, PeriodId, ReimbursementRecord,
};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Errors raised by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The period does not exist.
    #[error("payroll period {period_id} not found")]
    PeriodNotFound {
        /// The missing period.
        period_id: PeriodId,
    },

    /// The conditional lock found the period already locked.
    #[error("payroll period {period_id} is already locked")]
    PeriodLocked {
        /// The locked period.
        period_id: PeriodId,
    },

    /// A new period would share days with an existing one.
    #[error("payroll period {range} overlaps existing period {existing}")]
    PeriodOverlap {
        /// The requested dates.
        range: DateRange,
        /// The period already covering some of those dates.
        existing: PeriodId,
    },

    /// A payroll row already exists for the (employee, period) pair.
    #[error("payroll already exists for employee {employee_id} in period {period_id}")]
    DuplicatePayroll {
        /// The employee.
        employee_id: EmployeeId,
        /// The period.
        period_id: PeriodId,
    },

    /// A record was refused at intake.
    #[error("record rejected: {message}")]
    Rejected {
        /// Why the record was refused.
        message: String,
    },

    /// A stored row could not be decoded.
    #[error("corrupt row in {table}: {message}")]
    Corrupt {
        /// The table the row came from.
        table: &'static str,
        /// What failed to decode.
        message: String,
    },

    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// The underlying failure.
        message: String,
    },

    /// An error from the SQLite driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Read access to the employee roster.
#[async_trait]
pub trait EmployeeRoster: Send + Sync {
    /// Returns every employee, ordered by id.
    async fn all_employees(&self) -> StoreResult<Vec<Employee>>;

    /// Returns one employee by id.
    async fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;
}

/// Attendance days grouped by employee.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Counts attendance days per employee inside `range`.
    ///
    /// Employees without attendance are absent from the map.
    async fn attendance_counts(&self, range: DateRange) -> StoreResult<HashMap<EmployeeId, u32>>;
}

/// Overtime entries grouped by employee.
#[async_trait]
pub trait OvertimeSource: Send + Sync {
    /// Lists overtime entries per employee inside `range`, ordered by date.
    async fn overtime_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<OvertimeRecord>>>;
}

/// Reimbursement entries grouped by employee.
#[async_trait]
pub trait ReimbursementSource: Send + Sync {
    /// Lists reimbursements per employee inside `range`, ordered by date.
    async fn reimbursements_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<ReimbursementRecord>>>;
}

/// Payroll period lookup and creation.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    /// Loads a period by id.
    async fn period_by_id(&self, id: PeriodId) -> StoreResult<Option<PayrollPeriod>>;

    /// Loads the period whose range contains `date`.
    async fn period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayrollPeriod>>;

    /// Creates a new unlocked period, rejecting overlaps.
    async fn create_period(&self, period: NewPayrollPeriod) -> StoreResult<PayrollPeriod>;
}

/// Payroll persistence.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Inserts every payroll row and locks the period as one atomic unit.
    ///
    /// The lock is a conditional write that only succeeds while the period
    /// is unlocked. If it fails, or any insert fails, nothing is written.
    async fn commit_period_run(
        &self,
        period_id: PeriodId,
        payrolls: Vec<NewPayroll>,
        actor: &str,
    ) -> StoreResult<Vec<Payroll>>;

    /// Lists the payrolls written for a period, ordered by employee id.
    async fn payrolls_for_period(&self, period_id: PeriodId) -> StoreResult<Vec<Payroll>>;

    /// Loads one employee's payroll for a period.
    async fn payroll_for_employee(
        &self,
        employee_id: EmployeeId,
        period_id: PeriodId,
    ) -> StoreResult<Option<Payroll>>;
}

/// The set of storage capabilities a payroll run consumes.
#[derive(Clone)]
pub struct PayrollSources {
    /// Employee roster.
    pub employees: Arc<dyn EmployeeRoster>,
    /// Attendance counts.
    pub attendance: Arc<dyn AttendanceSource>,
    /// Overtime entries.
    pub overtime: Arc<dyn OvertimeSource>,
    /// Reimbursement entries.
    pub reimbursements: Arc<dyn ReimbursementSource>,
    /// Payroll periods.
    pub periods: Arc<dyn PeriodStore>,
    /// Payroll rows.
    pub payrolls: Arc<dyn PayrollStore>,
}

impl PayrollSources {
    /// Uses a single store for every capability.
    pub fn from_store<S>(store: S) -> Self
    where
        S: EmployeeRoster
            + AttendanceSource
            + OvertimeSource
            + ReimbursementSource
            + PeriodStore
            + PayrollStore
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            employees: store.clone(),
            attendance: store.clone(),
            overtime: store.clone(),
            reimbursements: store.clone(),
            periods: store.clone(),
            payrolls: store,
        }
    }
}

fn group_by_employee<T>(
    records: impl IntoIterator<Item = T>,
    employee_of: impl Fn(&T) -> EmployeeId,
) -> HashMap<EmployeeId, Vec<T>> {
    let mut grouped: HashMap<EmployeeId, Vec<T>> = HashMap::new();
    for record in records {
        grouped.entry(employee_of(&record)).or_default().push(record);
    }
    grouped
}
