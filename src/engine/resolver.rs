//! Payroll period resolution.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollPeriod, PeriodId};
use crate::storage::PeriodStore;

/// How a run names the period it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    /// A period by its identifier.
    Period(PeriodId),
    /// The period whose dates contain this day.
    ContainingDate(NaiveDate),
}

impl std::fmt::Display for RunTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunTarget::Period(id) => write!(f, "id {}", id),
            RunTarget::ContainingDate(date) => write!(f, "date {}", date),
        }
    }
}

/// Loads payroll periods and checks they can be calculated.
#[derive(Clone)]
pub struct PeriodResolver {
    periods: Arc<dyn PeriodStore>,
}

impl PeriodResolver {
    /// Creates a resolver over a period store.
    pub fn new(periods: Arc<dyn PeriodStore>) -> Self {
        Self { periods }
    }

    /// Resolves `target` to a period with a valid date range.
    ///
    /// Fails with [`EngineError::PeriodNotFound`] when nothing matches and
    /// [`EngineError::InvalidPeriod`] when the period starts after it ends.
    /// The lock flag is reported, not enforced.
    pub async fn resolve(&self, target: RunTarget) -> EngineResult<PayrollPeriod> {
        let found = match target {
            RunTarget::Period(id) => self.periods.period_by_id(id).await,
            RunTarget::ContainingDate(date) => self.periods.period_containing(date).await,
        }
        .map_err(|e| EngineError::AggregationFailure {
            source_name: "payroll periods".to_string(),
            message: e.to_string(),
        })?;

        let period = found.ok_or_else(|| EngineError::PeriodNotFound {
            lookup: target.to_string(),
        })?;
        period.validate()?;
        Ok(period)
    }
}
