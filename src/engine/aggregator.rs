//! Per-employee aggregation of a period's source records.
//!
//! The three sources are independent, so they are fetched concurrently.
//! Results are held in [`EmployeeLedger`]s, which make the "no entries"
//! default explicit: a missing employee counts as zero attendance days and
//! no overtime or reimbursements.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, EmployeeId, OvertimeRecord, ReimbursementRecord};
use crate::storage::{PayrollSources, StoreError};

/// A map keyed by employee id whose lookups fall back to a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeLedger<T> {
    entries: HashMap<EmployeeId, T>,
    empty: T,
}

impl<T: Default> EmployeeLedger<T> {
    /// Wraps a grouped map; absent employees resolve to `T::default()`.
    pub fn new(entries: HashMap<EmployeeId, T>) -> Self {
        Self {
            entries,
            empty: T::default(),
        }
    }
}

impl<T> EmployeeLedger<T> {
    /// Returns the entry for `employee_id`, or the empty default.
    pub fn get(&self, employee_id: EmployeeId) -> &T {
        self.entries.get(&employee_id).unwrap_or(&self.empty)
    }

    /// Number of employees with at least one entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no employee has an entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a period's payslips are calculated from.
#[derive(Debug, Clone)]
pub struct AggregatedInputs {
    /// Attendance days per employee.
    pub attendance: EmployeeLedger<u32>,
    /// Overtime entries per employee.
    pub overtime: EmployeeLedger<Vec<OvertimeRecord>>,
    /// Reimbursement entries per employee.
    pub reimbursements: EmployeeLedger<Vec<ReimbursementRecord>>,
}

impl AggregatedInputs {
    /// Attendance days for an employee, zero when absent.
    pub fn attendance_for(&self, employee_id: EmployeeId) -> u32 {
        *self.attendance.get(employee_id)
    }

    /// Overtime entries for an employee, empty when absent.
    pub fn overtime_for(&self, employee_id: EmployeeId) -> &[OvertimeRecord] {
        self.overtime.get(employee_id)
    }

    /// Reimbursements for an employee, empty when absent.
    pub fn reimbursements_for(&self, employee_id: EmployeeId) -> &[ReimbursementRecord] {
        self.reimbursements.get(employee_id)
    }
}

fn source_failed(source_name: &str) -> impl FnOnce(StoreError) -> EngineError + '_ {
    move |e| EngineError::AggregationFailure {
        source_name: source_name.to_string(),
        message: e.to_string(),
    }
}

/// Fetches attendance, overtime and reimbursements for `range`.
///
/// The first failing source aborts the aggregation with
/// [`EngineError::AggregationFailure`] naming it.
pub async fn aggregate(sources: &PayrollSources, range: DateRange) -> EngineResult<AggregatedInputs> {
    let (attendance, overtime, reimbursements) = tokio::try_join!(
        async {
            sources
                .attendance
                .attendance_counts(range)
                .await
                .map_err(source_failed("attendance"))
        },
        async {
            sources
                .overtime
                .overtime_by_employee(range)
                .await
                .map_err(source_failed("overtime"))
        },
        async {
            sources
                .reimbursements
                .reimbursements_by_employee(range)
                .await
                .map_err(source_failed("reimbursements"))
        },
    )?;

    Ok(AggregatedInputs {
        attendance: EmployeeLedger::new(attendance),
        overtime: EmployeeLedger::new(overtime),
        reimbursements: EmployeeLedger::new(reimbursements),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Audit, Employee, NewPayrollPeriod};
    use crate::storage::{InMemoryStore, OvertimeSource, PeriodStore, StoreResult};
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    async fn create_test_store() -> (InMemoryStore, DateRange) {
        let store = InMemoryStore::new();
        for id in [1, 2] {
            store
                .add_employee(Employee {
                    id,
                    name: format!("Employee {}", id),
                    email: format!("e{}@example.com", id),
                    salary: dec!(1000000),
                    audit: Audit::created_by("seed@example.com", Utc::now()),
                })
                .await;
        }
        let period = store
            .create_period(NewPayrollPeriod {
                start_date: date(1),
                end_date: date(30),
                created_by: "admin@example.com".to_string(),
            })
            .await
            .unwrap();
        (store, period.range())
    }

    struct FailingOvertime;

    #[async_trait]
    impl OvertimeSource for FailingOvertime {
        async fn overtime_by_employee(
            &self,
            _range: DateRange,
        ) -> StoreResult<HashMap<EmployeeId, Vec<OvertimeRecord>>> {
            Err(StoreError::Unavailable {
                message: "connection reset".to_string(),
            })
        }
    }

    #[test]
    fn test_ledger_defaults_for_absent_employee() {
        let ledger: EmployeeLedger<u32> = EmployeeLedger::new(HashMap::from([(1, 5)]));
        assert_eq!(*ledger.get(1), 5);
        assert_eq!(*ledger.get(2), 0);
        assert_eq!(ledger.len(), 1);

        let lists: EmployeeLedger<Vec<OvertimeRecord>> = EmployeeLedger::new(HashMap::new());
        assert!(lists.get(9).is_empty());
        assert!(lists.is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_groups_sources() {
        let (store, range) = create_test_store().await;
        store
            .record_attendance(crate::models::AttendanceRecord {
                employee_id: 1,
                date: date(3),
            })
            .await
            .unwrap();
        store
            .record_overtime(OvertimeRecord {
                employee_id: 2,
                date: date(4),
                hours: dec!(2),
            })
            .await
            .unwrap();

        let inputs = aggregate(&PayrollSources::from_store(store), range)
            .await
            .unwrap();

        assert_eq!(inputs.attendance_for(1), 1);
        assert_eq!(inputs.attendance_for(2), 0);
        assert_eq!(inputs.overtime_for(2).len(), 1);
        assert!(inputs.overtime_for(1).is_empty());
        assert!(inputs.reimbursements_for(1).is_empty());
    }

    #[tokio::test]
    async fn test_failing_source_is_named() {
        let (store, range) = create_test_store().await;
        let mut sources = PayrollSources::from_store(store);
        sources.overtime = Arc::new(FailingOvertime);

        match aggregate(&sources, range).await {
            Err(EngineError::AggregationFailure {
                source_name,
                message,
            }) => {
                assert_eq!(source_name, "overtime");
                assert!(message.contains("connection reset"));
            }
            other => panic!("Expected AggregationFailure, got {:?}", other),
        }
    }
}
