//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::RunRequest;
use crate::error::EngineError;
use crate::models::{EmployeeId, PeriodId};

use super::request::RunPayrollRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/payroll-periods/:period_id/run", post(run_handler))
        .route("/payroll-periods/:period_id/summary", get(summary_handler))
        .route(
            "/payroll-periods/:period_id/payslips/:employee_id",
            get(payslip_handler),
        )
        .with_state(state)
}

fn json_ok<T: Serialize>(body: T) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn json_error(correlation_id: Uuid, err: EngineError, context: &str) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "{}", context
    );
    ApiErrorResponse::from(err).into_response()
}

/// Handler for GET /healthz.
async fn health_handler() -> impl IntoResponse {
    json_ok(json!({ "status": "ok" }))
}

/// Handler for POST /payroll-periods/:period_id/run.
///
/// Runs payroll for the period and returns the run report.
async fn run_handler(
    State(state): State<AppState>,
    Path(period_id): Path<PeriodId>,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, period_id, "Processing payroll run request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error,
            }
            .into_response();
        }
    };

    match state
        .orchestrator()
        .run(RunRequest::for_period(period_id, request.actor_email))
        .await
    {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %report.run_id,
                period_id,
                employees = report.payroll_count,
                total_salary = %report.total_salary,
                duration_us = report.duration_us,
                "Payroll run request completed"
            );
            json_ok(report)
        }
        Err(err) => json_error(correlation_id, err, "Payroll run request failed"),
    }
}

/// Handler for GET /payroll-periods/:period_id/summary.
async fn summary_handler(
    State(state): State<AppState>,
    Path(period_id): Path<PeriodId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.reader().summarize(period_id).await {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                period_id,
                employees = summary.employees.len(),
                total_salary = %summary.total_salary,
                "Payroll summary served"
            );
            json_ok(summary)
        }
        Err(err) => json_error(correlation_id, err, "Payroll summary failed"),
    }
}

/// Handler for GET /payroll-periods/:period_id/payslips/:employee_id.
async fn payslip_handler(
    State(state): State<AppState>,
    Path((period_id, employee_id)): Path<(PeriodId, EmployeeId)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.reader().payslip(employee_id, period_id).await {
        Ok(payroll) => json_ok(payroll),
        Err(err) => json_error(correlation_id, err, "Payslip lookup failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RunReport;
    use crate::models::{Audit, Employee, NewPayrollPeriod};
    use crate::storage::{InMemoryStore, PayrollSources, PeriodStore};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn create_test_state() -> (AppState, PeriodId) {
        let store = InMemoryStore::new();
        store
            .add_employee(Employee {
                id: 1,
                name: "Ayu".to_string(),
                email: "ayu@example.com".to_string(),
                salary: dec!(2000000),
                audit: Audit::created_by("seed@example.com", Utc::now()),
            })
            .await;
        let period = store
            .create_period(NewPayrollPeriod {
                start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 7, 29).unwrap(),
                created_by: "admin@example.com".to_string(),
            })
            .await
            .unwrap();
        (AppState::new(PayrollSources::from_store(store)), period.id)
    }

    fn run_request(period_id: PeriodId, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/payroll-periods/{}/run", period_id))
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let (state, _) = create_test_state().await;
        let response = create_router(state)
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_run_returns_report() {
        let (state, period_id) = create_test_state().await;
        let response = create_router(state)
            .oneshot(run_request(
                period_id,
                json!({ "actor_email": "admin@example.com" }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: RunReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.period_id, period_id);
        assert_eq!(report.payroll_count, 1);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let (state, period_id) = create_test_state().await;
        let response = create_router(state)
            .oneshot(run_request(period_id, "{invalid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_actor_returns_400() {
        let (state, period_id) = create_test_state().await;
        let response = create_router(state)
            .oneshot(run_request(period_id, "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_period_returns_404() {
        let (state, _) = create_test_state().await;
        let response = create_router(state)
            .oneshot(run_request(
                77,
                json!({ "actor_email": "admin@example.com" }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "PERIOD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_payslip_before_run_returns_404() {
        let (state, period_id) = create_test_state().await;
        let response = create_router(state)
            .oneshot(
                Request::get(format!("/payroll-periods/{}/payslips/1", period_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "PAYSLIP_NOT_FOUND");
    }
}
