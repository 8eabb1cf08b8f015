//! Response types for the payroll engine API.
//!
//! This module defines the error response structure and how each
//! [`EngineError`] maps to an HTTP status.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: &str, error: &EngineError, details: &str) -> Self {
        Self {
            status,
            error: ApiError::with_details(code, error.to_string(), details),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        use StatusCode as S;
        let (status, code, details) = match &error {
            EngineError::PeriodNotFound { .. } => (
                S::NOT_FOUND,
                "PERIOD_NOT_FOUND",
                "No payroll period matches the request",
            ),
            EngineError::PeriodLocked { .. } => (
                S::CONFLICT,
                "PERIOD_LOCKED",
                "Payroll has already been run for this period",
            ),
            EngineError::NoEmployeesFound { .. } => (
                S::UNPROCESSABLE_ENTITY,
                "NO_EMPLOYEES_FOUND",
                "There are no employees to run payroll for",
            ),
            EngineError::InvalidPeriod { .. } => (
                S::UNPROCESSABLE_ENTITY,
                "INVALID_PERIOD",
                "The payroll period cannot be calculated",
            ),
            EngineError::InvalidRecord { .. } => (
                S::UNPROCESSABLE_ENTITY,
                "INVALID_RECORD",
                "A source record for this period is invalid",
            ),
            EngineError::InvalidActor { .. } => (
                S::UNPROCESSABLE_ENTITY,
                "INVALID_ACTOR",
                "The actor email is missing or malformed",
            ),
            EngineError::AggregationFailure { .. } => (
                S::INTERNAL_SERVER_ERROR,
                "AGGREGATION_FAILURE",
                "A data source could not be read",
            ),
            EngineError::PersistenceFailure { .. } => (
                S::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_FAILURE",
                "Payrolls could not be saved; the period remains unlocked",
            ),
            EngineError::NoPayrollsFound { .. } => (
                S::NOT_FOUND,
                "NO_PAYROLLS_FOUND",
                "Payroll has not been run for this period",
            ),
            EngineError::PayslipNotFound { .. } => (
                S::NOT_FOUND,
                "PAYSLIP_NOT_FOUND",
                "No payslip exists for this employee and period",
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                S::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error",
            ),
        };
        Self::new(status, code, &error, details)
    }
}
