//! Atomic persistence of a period's payrolls.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{EngineError, EngineResult};
use crate::models::{NewPayroll, Payroll, PeriodId};
use crate::storage::{PayrollStore, StoreError};

/// Writes a run's payroll rows and locks its period in one commit.
#[derive(Clone)]
pub struct BatchPersister {
    payrolls: Arc<dyn PayrollStore>,
}

impl BatchPersister {
    /// Creates a persister over a payroll store.
    pub fn new(payrolls: Arc<dyn PayrollStore>) -> Self {
        Self { payrolls }
    }

    /// Commits `batch` for `period_id` on behalf of `actor`.
    ///
    /// The batch is checked before storage is touched: it must be non-empty,
    /// target `period_id` only, and hold at most one row per employee. A
    /// period locked by someone else in the meantime surfaces as
    /// [`EngineError::PeriodLocked`]; every other storage failure is a
    /// [`EngineError::PersistenceFailure`]. Either way nothing is written.
    pub async fn persist(
        &self,
        period_id: PeriodId,
        batch: Vec<NewPayroll>,
        actor: &str,
    ) -> EngineResult<Vec<Payroll>> {
        validate_batch(period_id, &batch)?;

        self.payrolls
            .commit_period_run(period_id, batch, actor)
            .await
            .map_err(|e| match e {
                StoreError::PeriodLocked { period_id } => EngineError::PeriodLocked { period_id },
                other => EngineError::PersistenceFailure {
                    period_id,
                    message: other.to_string(),
                },
            })
    }
}

fn validate_batch(period_id: PeriodId, batch: &[NewPayroll]) -> EngineResult<()> {
    let rejected = |message: String| EngineError::PersistenceFailure { period_id, message };

    if batch.is_empty() {
        return Err(rejected("refusing to commit an empty payroll batch".to_string()));
    }

    let mut employees = HashSet::with_capacity(batch.len());
    for payroll in batch {
        if payroll.period_id != period_id {
            return Err(rejected(format!(
                "payroll for employee {} targets period {}",
                payroll.employee_id, payroll.period_id
            )));
        }
        if !employees.insert(payroll.employee_id) {
            return Err(rejected(format!(
                "employee {} appears twice in the batch",
                payroll.employee_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPayrollPeriod, Payslip};
    use crate::storage::{InMemoryStore, PeriodStore};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_payroll(employee_id: i64, period_id: PeriodId) -> NewPayroll {
        NewPayroll {
            employee_id,
            period_id,
            payslip: Payslip {
                employee_id,
                period_id,
                attendance_count: 0,
                total_workdays: 20,
                attendance_salary: Decimal::ZERO,
                salary_per_hour: Decimal::ZERO,
                overtime_recap: vec![],
                overtime_total_hours: Decimal::ZERO,
                overtime_salary: Decimal::ZERO,
                reimbursements: vec![],
                reimbursement_total: Decimal::ZERO,
                total_salary: Decimal::ZERO,
                description: String::new(),
            },
            created_by: "admin@example.com".to_string(),
        }
    }

    async fn create_test_persister() -> (BatchPersister, InMemoryStore, PeriodId) {
        let store = InMemoryStore::new();
        let period = store
            .create_period(NewPayrollPeriod {
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                created_by: "admin@example.com".to_string(),
            })
            .await
            .unwrap();
        (BatchPersister::new(Arc::new(store.clone())), store, period.id)
    }

    #[tokio::test]
    async fn test_persist_locks_period() {
        let (persister, store, period_id) = create_test_persister().await;
        let written = persister
            .persist(period_id, vec![new_payroll(1, period_id)], "admin@example.com")
            .await
            .unwrap();
        assert_eq!(written.len(), 1);
        assert!(store.period_by_id(period_id).await.unwrap().unwrap().locked);
    }

    #[tokio::test]
    async fn test_empty_batch_rejected_before_storage() {
        let (persister, store, period_id) = create_test_persister().await;
        let result = persister.persist(period_id, vec![], "admin@example.com").await;
        assert!(matches!(result, Err(EngineError::PersistenceFailure { .. })));
        assert!(!store.period_by_id(period_id).await.unwrap().unwrap().locked);
    }

    #[tokio::test]
    async fn test_duplicate_employee_rejected() {
        let (persister, store, period_id) = create_test_persister().await;
        let batch = vec![new_payroll(1, period_id), new_payroll(1, period_id)];
        let result = persister.persist(period_id, batch, "admin@example.com").await;
        assert!(matches!(result, Err(EngineError::PersistenceFailure { .. })));
        assert!(!store.period_by_id(period_id).await.unwrap().unwrap().locked);
    }

    #[tokio::test]
    async fn test_foreign_period_row_rejected() {
        let (persister, _, period_id) = create_test_persister().await;
        let batch = vec![new_payroll(1, period_id + 1)];
        let result = persister.persist(period_id, batch, "admin@example.com").await;
        assert!(matches!(result, Err(EngineError::PersistenceFailure { .. })));
    }

    #[tokio::test]
    async fn test_locked_period_maps_to_period_locked() {
        let (persister, _, period_id) = create_test_persister().await;
        persister
            .persist(period_id, vec![new_payroll(1, period_id)], "a@example.com")
            .await
            .unwrap();
        let result = persister
            .persist(period_id, vec![new_payroll(1, period_id)], "b@example.com")
            .await;
        assert!(matches!(result, Err(EngineError::PeriodLocked { period_id: id }) if id == period_id));
    }
}
