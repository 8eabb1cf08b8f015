//! Request types for the payroll engine API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /payroll-periods/:period_id/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayrollRequest {
    /// Email of the admin running payroll, recorded in audit fields.
    pub actor_email: String,
}
