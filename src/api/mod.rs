//! HTTP API module for the payroll engine.
//!
//! A thin adapter over [`crate::engine`]: one endpoint runs payroll for a
//! period, two more read the results back.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::RunPayrollRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
