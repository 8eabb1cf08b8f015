//! Read-only views over persisted payrolls.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeId, EmployeePayrollSummary, Payroll, PayrollSummary, PeriodId};
use crate::storage::{PayrollSources, StoreError};

fn read_failed(source_name: &'static str) -> impl FnOnce(StoreError) -> EngineError {
    move |e| EngineError::AggregationFailure {
        source_name: source_name.to_string(),
        message: e.to_string(),
    }
}

/// Reads the payrolls a run has written.
#[derive(Clone)]
pub struct PayrollReader {
    sources: PayrollSources,
}

impl PayrollReader {
    /// Creates a reader over the given storage capabilities.
    pub fn new(sources: PayrollSources) -> Self {
        Self { sources }
    }

    /// Summarizes every payroll of a period, ordered by employee id.
    ///
    /// Fails with [`EngineError::PeriodNotFound`] for an unknown period and
    /// [`EngineError::NoPayrollsFound`] for a period that has not been run.
    pub async fn summarize(&self, period_id: PeriodId) -> EngineResult<PayrollSummary> {
        let period = self
            .sources
            .periods
            .period_by_id(period_id)
            .await
            .map_err(read_failed("payroll periods"))?;
        if period.is_none() {
            return Err(EngineError::PeriodNotFound {
                lookup: format!("id {}", period_id),
            });
        }

        let (payrolls, employees) = tokio::try_join!(
            async {
                self.sources
                    .payrolls
                    .payrolls_for_period(period_id)
                    .await
                    .map_err(read_failed("payrolls"))
            },
            async {
                self.sources
                    .employees
                    .all_employees()
                    .await
                    .map_err(read_failed("employees"))
            },
        )?;
        if payrolls.is_empty() {
            return Err(EngineError::NoPayrollsFound { period_id });
        }

        let names: HashMap<EmployeeId, String> =
            employees.into_iter().map(|e| (e.id, e.name)).collect();

        let lines: Vec<EmployeePayrollSummary> = payrolls
            .iter()
            .map(|payroll| EmployeePayrollSummary {
                employee_id: payroll.employee_id,
                employee_name: names.get(&payroll.employee_id).cloned().unwrap_or_default(),
                total_salary: payroll.payslip.total_salary,
            })
            .collect();
        let total_salary: Decimal = lines.iter().map(|line| line.total_salary).sum();

        Ok(PayrollSummary {
            period_id,
            employees: lines,
            total_salary,
        })
    }

    /// Loads one employee's payroll for a period.
    pub async fn payslip(
        &self,
        employee_id: EmployeeId,
        period_id: PeriodId,
    ) -> EngineResult<Payroll> {
        self.sources
            .payrolls
            .payroll_for_employee(employee_id, period_id)
            .await
            .map_err(read_failed("payrolls"))?
            .ok_or(EngineError::PayslipNotFound {
                employee_id,
                period_id,
            })
    }
}
