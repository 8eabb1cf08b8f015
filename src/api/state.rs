//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::engine::{PayrollReader, RunOrchestrator};
use crate::storage::PayrollSources;

/// Shared application state.
///
/// Holds the run orchestrator and the payroll reader, both built over the
/// same storage capabilities.
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<RunOrchestrator>,
    reader: Arc<PayrollReader>,
}

impl AppState {
    /// Creates a new application state over the given storage.
    pub fn new(sources: PayrollSources) -> Self {
        Self {
            orchestrator: Arc::new(RunOrchestrator::new(sources.clone())),
            reader: Arc::new(PayrollReader::new(sources)),
        }
    }

    /// Returns the run orchestrator.
    pub fn orchestrator(&self) -> &RunOrchestrator {
        &self.orchestrator
    }

    /// Returns the payroll reader.
    pub fn reader(&self) -> &PayrollReader {
        &self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState>();
    }
}
