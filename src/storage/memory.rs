use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{
    AttendanceSource, EmployeeRoster, OvertimeSource, PayrollStore, PeriodStore,
    ReimbursementSource, StoreError, StoreResult, group_by_employee,
};
use crate::models::{
    AttendanceRecord, Audit, DateRange, Employee, EmployeeId, NewPayroll, NewPayrollPeriod,
    OvertimeRecord, Payroll, PayrollId, PayrollPeriod, PeriodId, ReimbursementRecord,
};

#[derive(Default)]
struct MemoryState {
    employees: BTreeMap<EmployeeId, Employee>,
    periods: BTreeMap<PeriodId, PayrollPeriod>,
    attendance: Vec<AttendanceRecord>,
    overtime: Vec<OvertimeRecord>,
    reimbursements: Vec<ReimbursementRecord>,
    payrolls: BTreeMap<(PeriodId, EmployeeId), Payroll>,
    last_period_id: PeriodId,
    last_payroll_id: PayrollId,
}

impl MemoryState {
    fn locked_period_containing(&self, date: NaiveDate) -> Option<PeriodId> {
        self.periods
            .values()
            .find(|p| p.locked && p.contains_date(date))
            .map(|p| p.id)
    }

    fn ensure_writable(&self, employee_id: EmployeeId, date: NaiveDate) -> StoreResult<()> {
        if !self.employees.contains_key(&employee_id) {
            return Err(StoreError::Rejected {
                message: format!("unknown employee {}", employee_id),
            });
        }
        if let Some(period_id) = self.locked_period_containing(date) {
            return Err(StoreError::PeriodLocked { period_id });
        }
        Ok(())
    }
}

/// A thread-safe in-memory store implementing every storage port.
///
/// All state sits behind one `tokio::sync::RwLock`, so
/// [`PayrollStore::commit_period_run`] holds the write lock across the
/// lock check, the inserts and the lock flip. Clones share the same state.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee on the roster.
    pub async fn add_employee(&self, employee: Employee) {
        let mut state = self.state.write().await;
        state.employees.insert(employee.id, employee);
    }

    /// Records a day of attendance.
    ///
    /// Rejects unknown employees, a second record for the same day, and
    /// dates inside a locked period.
    pub async fn record_attendance(&self, record: AttendanceRecord) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.ensure_writable(record.employee_id, record.date)?;
        if state
            .attendance
            .iter()
            .any(|a| a.employee_id == record.employee_id && a.date == record.date)
        {
            return Err(StoreError::Rejected {
                message: format!(
                    "attendance already recorded for employee {} on {}",
                    record.employee_id, record.date
                ),
            });
        }
        state.attendance.push(record);
        Ok(())
    }

    /// Records overtime hours.
    ///
    /// Rejects hours outside (0, 3], a second entry for the same day, and
    /// dates inside a locked period.
    pub async fn record_overtime(&self, record: OvertimeRecord) -> StoreResult<()> {
        record.validate().map_err(|e| StoreError::Rejected {
            message: e.to_string(),
        })?;
        let mut state = self.state.write().await;
        state.ensure_writable(record.employee_id, record.date)?;
        if state
            .overtime
            .iter()
            .any(|o| o.employee_id == record.employee_id && o.date == record.date)
        {
            return Err(StoreError::Rejected {
                message: format!(
                    "overtime already recorded for employee {} on {}",
                    record.employee_id, record.date
                ),
            });
        }
        state.overtime.push(record);
        Ok(())
    }

    /// Records a reimbursement.
    pub async fn record_reimbursement(&self, record: ReimbursementRecord) -> StoreResult<()> {
        record.validate().map_err(|e| StoreError::Rejected {
            message: e.to_string(),
        })?;
        let mut state = self.state.write().await;
        state.ensure_writable(record.employee_id, record.date)?;
        state.reimbursements.push(record);
        Ok(())
    }
}

#[async_trait]
impl EmployeeRoster for InMemoryStore {
    async fn all_employees(&self) -> StoreResult<Vec<Employee>> {
        let state = self.state.read().await;
        Ok(state.employees.values().cloned().collect())
    }

    async fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        let state = self.state.read().await;
        Ok(state.employees.get(&id).cloned())
    }
}

#[async_trait]
impl AttendanceSource for InMemoryStore {
    async fn attendance_counts(&self, range: DateRange) -> StoreResult<HashMap<EmployeeId, u32>> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for record in state.attendance.iter().filter(|a| range.contains(a.date)) {
            *counts.entry(record.employee_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl OvertimeSource for InMemoryStore {
    async fn overtime_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<OvertimeRecord>>> {
        let state = self.state.read().await;
        let mut records: Vec<OvertimeRecord> = state
            .overtime
            .iter()
            .filter(|o| range.contains(o.date))
            .cloned()
            .collect();
        records.sort_by_key(|o| o.date);
        Ok(group_by_employee(records, |o| o.employee_id))
    }
}

#[async_trait]
impl ReimbursementSource for InMemoryStore {
    async fn reimbursements_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<ReimbursementRecord>>> {
        let state = self.state.read().await;
        let mut records: Vec<ReimbursementRecord> = state
            .reimbursements
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(group_by_employee(records, |r| r.employee_id))
    }
}

#[async_trait]
impl PeriodStore for InMemoryStore {
    async fn period_by_id(&self, id: PeriodId) -> StoreResult<Option<PayrollPeriod>> {
        let state = self.state.read().await;
        Ok(state.periods.get(&id).cloned())
    }

    async fn period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayrollPeriod>> {
        let state = self.state.read().await;
        Ok(state
            .periods
            .values()
            .find(|p| p.contains_date(date))
            .cloned())
    }

    async fn create_period(&self, period: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        let mut state = self.state.write().await;
        let range = period.range();
        if range.start > range.end {
            return Err(StoreError::Rejected {
                message: format!("period {} ends before it starts", range),
            });
        }
        if let Some(existing) = state.periods.values().find(|p| p.range().overlaps(&range)) {
            return Err(StoreError::PeriodOverlap {
                range,
                existing: existing.id,
            });
        }

        state.last_period_id += 1;
        let created = PayrollPeriod {
            id: state.last_period_id,
            start_date: period.start_date,
            end_date: period.end_date,
            locked: false,
            audit: Audit::created_by(&period.created_by, Utc::now()),
        };
        state.periods.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn commit_period_run(
        &self,
        period_id: PeriodId,
        payrolls: Vec<NewPayroll>,
        actor: &str,
    ) -> StoreResult<Vec<Payroll>> {
        let mut state = self.state.write().await;

        // Conditional lock: only an unlocked period may be committed.
        match state.periods.get(&period_id) {
            None => return Err(StoreError::PeriodNotFound { period_id }),
            Some(period) if period.locked => return Err(StoreError::PeriodLocked { period_id }),
            Some(_) => {}
        }

        let mut seen = HashSet::with_capacity(payrolls.len());
        for payroll in &payrolls {
            if payroll.period_id != period_id {
                return Err(StoreError::Rejected {
                    message: format!(
                        "payroll for employee {} targets period {}, not {}",
                        payroll.employee_id, payroll.period_id, period_id
                    ),
                });
            }
            if !seen.insert(payroll.employee_id)
                || state
                    .payrolls
                    .contains_key(&(period_id, payroll.employee_id))
            {
                return Err(StoreError::DuplicatePayroll {
                    employee_id: payroll.employee_id,
                    period_id,
                });
            }
        }

        // Nothing below can fail, so the batch lands whole.
        let now = Utc::now();
        let mut written = Vec::with_capacity(payrolls.len());
        for payroll in payrolls {
            state.last_payroll_id += 1;
            let row = Payroll {
                id: state.last_payroll_id,
                employee_id: payroll.employee_id,
                period_id,
                payslip: payroll.payslip,
                audit: Audit::created_by(&payroll.created_by, now),
            };
            state
                .payrolls
                .insert((period_id, row.employee_id), row.clone());
            written.push(row);
        }

        if let Some(period) = state.periods.get_mut(&period_id) {
            period.locked = true;
            period.audit = period.audit.touched_by(actor, now);
        }

        Ok(written)
    }

    async fn payrolls_for_period(&self, period_id: PeriodId) -> StoreResult<Vec<Payroll>> {
        let state = self.state.read().await;
        Ok(state
            .payrolls
            .range((period_id, EmployeeId::MIN)..=(period_id, EmployeeId::MAX))
            .map(|(_, payroll)| payroll.clone())
            .collect())
    }

    async fn payroll_for_employee(
        &self,
        employee_id: EmployeeId,
        period_id: PeriodId,
    ) -> StoreResult<Option<Payroll>> {
        let state = self.state.read().await;
        Ok(state.payrolls.get(&(period_id, employee_id)).cloned())
    }
}
