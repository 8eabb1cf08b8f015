//! The payroll run pipeline.
//!
//! A run moves forward through [`RunState`]s and never revisits one:
//!
//! ```text
//! Idle -> Validating -> Aggregating -> Calculating -> Persisting -> Locked
//! ```
//!
//! Any non-terminal state may instead end in `Failed`. Nothing is written
//! before `Persisting`, and persistence is a single atomic commit, so a
//! failed run leaves the period unlocked with no payroll rows.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::aggregator::aggregate;
use super::persister::BatchPersister;
use super::resolver::{PeriodResolver, RunTarget};
use crate::calculation::{PayslipInputs, calculate_payslip};
use crate::error::{EngineError, EngineResult};
use crate::models::{DateRange, NewPayroll, PayrollPeriod, PeriodId};
use crate::storage::PayrollSources;

/// Stage of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Not started.
    Idle,
    /// Checking the actor and resolving the period.
    Validating,
    /// Fetching the roster and source records.
    Aggregating,
    /// Computing payslips.
    Calculating,
    /// Committing payrolls and the period lock.
    Persisting,
    /// Completed; the period is locked.
    Locked,
    /// Aborted; the period is unchanged.
    Failed,
}

impl RunState {
    /// Returns true for `Locked` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Locked | RunState::Failed)
    }

    /// Returns true if a run may move from `self` to `next`.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::engine::RunState;
    ///
    /// assert!(RunState::Idle.can_transition_to(RunState::Validating));
    /// assert!(RunState::Calculating.can_transition_to(RunState::Failed));
    /// assert!(!RunState::Locked.can_transition_to(RunState::Failed));
    /// assert!(!RunState::Persisting.can_transition_to(RunState::Aggregating));
    /// ```
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Aggregating)
                | (Aggregating, Calculating)
                | (Calculating, Persisting)
                | (Persisting, Locked)
        ) || (next == Failed && !self.is_terminal())
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Validating => "validating",
            RunState::Aggregating => "aggregating",
            RunState::Calculating => "calculating",
            RunState::Persisting => "persisting",
            RunState::Locked => "locked",
            RunState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Tracks a single run's state, refusing backward or skipped transitions.
#[derive(Debug, Clone)]
pub struct RunProgress {
    run_id: Uuid,
    state: RunState,
}

impl RunProgress {
    /// Starts tracking a run in `Idle`.
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: RunState::Idle,
        }
    }

    /// The current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Moves to `next` if allowed, returning whether the move happened.
    ///
    /// A refused move leaves the state unchanged.
    pub fn advance(&mut self, next: RunState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(
                run_id = %self.run_id,
                from = %self.state,
                to = %next,
                "Rejected run state transition"
            );
            return false;
        }
        debug!(
            run_id = %self.run_id,
            from = %self.state,
            to = %next,
            "Run state transition"
        );
        self.state = next;
        true
    }
}

/// A request to run payroll for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// The period to run.
    pub target: RunTarget,
    /// Email of the admin triggering the run, recorded in audit fields.
    pub actor_email: String,
}

impl RunRequest {
    /// Requests a run for the period with id `period_id`.
    pub fn for_period(period_id: PeriodId, actor_email: impl Into<String>) -> Self {
        Self {
            target: RunTarget::Period(period_id),
            actor_email: actor_email.into(),
        }
    }

    /// Requests a run for the period containing `date`.
    pub fn for_date(date: NaiveDate, actor_email: impl Into<String>) -> Self {
        Self {
            target: RunTarget::ContainingDate(date),
            actor_email: actor_email.into(),
        }
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of this run, also present in its log lines.
    pub run_id: Uuid,
    /// The period that was run.
    pub period_id: PeriodId,
    /// The period's dates.
    pub period: DateRange,
    /// Number of payroll rows written.
    pub payroll_count: usize,
    /// Sum of every payslip's total salary.
    pub total_salary: Decimal,
    /// Always [`RunState::Locked`] for a returned report.
    pub final_state: RunState,
    /// Wall-clock time the run took, in microseconds.
    pub duration_us: u64,
}

/// Runs payroll for a period: validate, aggregate, calculate, persist.
///
/// This is the only entry point that writes payrolls or locks periods.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::engine::{RunOrchestrator, RunRequest};
/// use payroll_engine::storage::{InMemoryStore, PayrollSources};
///
/// # async fn example() -> payroll_engine::error::EngineResult<()> {
/// let orchestrator = RunOrchestrator::new(PayrollSources::from_store(InMemoryStore::new()));
/// let report = orchestrator
///     .run(RunRequest::for_period(1, "admin@example.com"))
///     .await?;
/// println!("{} payrolls, total {}", report.payroll_count, report.total_salary);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RunOrchestrator {
    sources: PayrollSources,
    resolver: PeriodResolver,
    persister: BatchPersister,
}

impl RunOrchestrator {
    /// Creates an orchestrator over the given storage capabilities.
    pub fn new(sources: PayrollSources) -> Self {
        Self {
            resolver: PeriodResolver::new(sources.periods.clone()),
            persister: BatchPersister::new(sources.payrolls.clone()),
            sources,
        }
    }

    /// Executes one payroll run.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidActor`] if `actor_email` is not an email
    /// - [`EngineError::PeriodNotFound`] / [`EngineError::InvalidPeriod`]
    ///   if the target does not resolve to a usable period
    /// - [`EngineError::PeriodLocked`] if the period was already run,
    ///   including by a concurrent run that committed first
    /// - [`EngineError::NoEmployeesFound`] if the roster is empty
    /// - [`EngineError::AggregationFailure`] if a data source fails
    /// - [`EngineError::InvalidRecord`] if a source record is invalid
    /// - [`EngineError::PersistenceFailure`] if the commit fails
    pub async fn run(&self, request: RunRequest) -> EngineResult<RunReport> {
        let started = Instant::now();
        let mut progress = RunProgress::new(Uuid::new_v4());
        let run_id = progress.run_id;
        info!(
            run_id = %run_id,
            target = %request.target,
            actor = %request.actor_email,
            "Starting payroll run"
        );

        match self.execute(&request, &mut progress).await {
            Ok(mut report) => {
                report.duration_us = elapsed_us(started);
                info!(
                    run_id = %run_id,
                    period_id = report.period_id,
                    state = %report.final_state,
                    employees = report.payroll_count,
                    total_salary = %report.total_salary,
                    duration_us = report.duration_us,
                    "Payroll run completed"
                );
                Ok(report)
            }
            Err(err) => {
                let failed_in = progress.state();
                enter(&mut progress, RunState::Failed);
                warn!(
                    run_id = %run_id,
                    state = %failed_in,
                    error = %err,
                    duration_us = elapsed_us(started),
                    "Payroll run failed"
                );
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        request: &RunRequest,
        progress: &mut RunProgress,
    ) -> EngineResult<RunReport> {
        let run_id = progress.run_id;

        enter(progress, RunState::Validating);
        let actor = validate_actor(&request.actor_email)?;
        let period = self.resolver.resolve(request.target).await?;
        if period.locked {
            return Err(EngineError::PeriodLocked {
                period_id: period.id,
            });
        }

        enter(progress, RunState::Aggregating);
        info!(
            run_id = %run_id,
            period_id = period.id,
            range = %period.range(),
            "Aggregating period inputs"
        );
        let roster = async {
            self.sources
                .employees
                .all_employees()
                .await
                .map_err(|e| EngineError::AggregationFailure {
                    source_name: "employees".to_string(),
                    message: e.to_string(),
                })
        };
        let (employees, inputs) =
            tokio::try_join!(roster, aggregate(&self.sources, period.range()))?;
        if employees.is_empty() {
            return Err(EngineError::NoEmployeesFound {
                period_id: period.id,
            });
        }

        enter(progress, RunState::Calculating);
        let batch = employees
            .iter()
            .map(|employee| -> EngineResult<NewPayroll> {
                let payslip = calculate_payslip(
                    employee,
                    PayslipInputs {
                        attendance_count: inputs.attendance_for(employee.id),
                        overtime: inputs.overtime_for(employee.id),
                        reimbursements: inputs.reimbursements_for(employee.id),
                    },
                    &period,
                )?;
                debug!(
                    run_id = %run_id,
                    employee_id = employee.id,
                    total_salary = %payslip.total_salary,
                    "Calculated payslip"
                );
                Ok(NewPayroll {
                    employee_id: employee.id,
                    period_id: period.id,
                    payslip,
                    created_by: actor.to_string(),
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        let total_salary = batch
            .iter()
            .try_fold(Decimal::ZERO, |sum, payroll| {
                sum.checked_add(payroll.payslip.total_salary)
                    .ok_or_else(|| EngineError::InvalidRecord {
                        employee_id: payroll.employee_id,
                        message: "run total salary overflows".to_string(),
                    })
            })?;

        enter(progress, RunState::Persisting);
        let written = self.persister.persist(period.id, batch, actor).await?;

        enter(progress, RunState::Locked);
        Ok(report_for(
            run_id,
            &period,
            written.len(),
            total_salary,
            progress.state(),
        ))
    }
}

/// Moves the run forward. The pipeline only requests legal transitions.
fn enter(progress: &mut RunProgress, next: RunState) {
    let from = progress.state();
    let moved = progress.advance(next);
    debug_assert!(moved, "illegal run transition {} -> {}", from, next);
}

fn elapsed_us(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

fn validate_actor(actor_email: &str) -> EngineResult<&str> {
    let actor = actor_email.trim();
    if actor.is_empty() {
        return Err(EngineError::InvalidActor {
            message: "actor email is required".to_string(),
        });
    }
    if !actor.contains('@') {
        return Err(EngineError::InvalidActor {
            message: format!("'{}' is not an email address", actor),
        });
    }
    Ok(actor)
}

fn report_for(
    run_id: Uuid,
    period: &PayrollPeriod,
    payroll_count: usize,
    total_salary: Decimal,
    final_state: RunState,
) -> RunReport {
    RunReport {
        run_id,
        period_id: period.id,
        period: period.range(),
        payroll_count,
        total_salary,
        final_state,
        duration_us: 0,
    }
}
