//! The Payroll Period Run Engine.
//!
//! [`RunOrchestrator`] is the single entry point for running a period. It
//! resolves the period, aggregates the period's source records, calculates
//! one payslip per employee and commits them together with the period lock.
//! [`PayrollReader`] serves the results afterwards.

mod aggregator;
mod orchestrator;
mod persister;
mod resolver;
mod summary;

pub use aggregator::{AggregatedInputs, EmployeeLedger, aggregate};
pub use orchestrator::{RunOrchestrator, RunProgress, RunReport, RunRequest, RunState};
pub use persister::BatchPersister;
pub use resolver::{PeriodResolver, RunTarget};
pub use summary::PayrollReader;
