//! Performance benchmarks for the Payroll Period Run Engine.
//!
//! This benchmark suite covers:
//! - The pure payslip calculator for a single employee
//! - Complete runs over the in-memory store at increasing roster sizes
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::calculation::{PayslipInputs, calculate_payslip};
use payroll_engine::engine::{RunOrchestrator, RunRequest};
use payroll_engine::models::{
    AttendanceRecord, Audit, Employee, NewPayrollPeriod, OvertimeRecord, PayrollPeriod, PeriodId,
    ReimbursementRecord,
};
use payroll_engine::storage::{InMemoryStore, PayrollSources, PeriodStore};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, d).expect("valid July 2024 date")
}

fn create_employee(id: i64) -> Employee {
    Employee {
        id,
        name: format!("Employee {}", id),
        email: format!("employee{}@example.com", id),
        salary: Decimal::new(2_100_000, 0),
        audit: Audit::created_by("bench@example.com", Utc::now()),
    }
}

fn create_period() -> PayrollPeriod {
    PayrollPeriod {
        id: 1,
        start_date: date(1),
        end_date: date(29),
        locked: false,
        audit: Audit::created_by("bench@example.com", Utc::now()),
    }
}

/// Seeds `employees` employees, each with a week of attendance, two overtime
/// entries and one reimbursement.
async fn seed_run(employees: i64) -> (RunOrchestrator, PeriodId) {
    let store = InMemoryStore::new();
    let period = store
        .create_period(NewPayrollPeriod {
            start_date: date(1),
            end_date: date(29),
            created_by: "bench@example.com".to_string(),
        })
        .await
        .expect("Failed to create period");

    for id in 1..=employees {
        store.add_employee(create_employee(id)).await;
        for day in 1..=5 {
            store
                .record_attendance(AttendanceRecord {
                    employee_id: id,
                    date: date(day),
                })
                .await
                .expect("Failed to record attendance");
        }
        for day in [2, 3] {
            store
                .record_overtime(OvertimeRecord {
                    employee_id: id,
                    date: date(day),
                    hours: Decimal::new(15, 1),
                })
                .await
                .expect("Failed to record overtime");
        }
        store
            .record_reimbursement(ReimbursementRecord {
                employee_id: id,
                date: date(4),
                amount: Decimal::new(50_000, 0),
                description: "Taxi".to_string(),
            })
            .await
            .expect("Failed to record reimbursement");
    }

    (RunOrchestrator::new(PayrollSources::from_store(store)), period.id)
}

/// Benchmark: one payslip from in-memory inputs.
fn bench_single_payslip(c: &mut Criterion) {
    let employee = create_employee(1);
    let period = create_period();
    let overtime: Vec<OvertimeRecord> = (2..=4)
        .map(|d| OvertimeRecord {
            employee_id: 1,
            date: date(d),
            hours: Decimal::new(2, 0),
        })
        .collect();
    let reimbursements = vec![ReimbursementRecord {
        employee_id: 1,
        date: date(5),
        amount: Decimal::new(50_000, 0),
        description: "Taxi".to_string(),
    }];

    c.bench_function("single_payslip", |b| {
        b.iter(|| {
            let inputs = PayslipInputs {
                attendance_count: 20,
                overtime: &overtime,
                reimbursements: &reimbursements,
            };
            black_box(calculate_payslip(
                black_box(&employee),
                inputs,
                black_box(&period),
            ))
        })
    });
}

/// Benchmark: complete runs at increasing roster sizes.
///
/// Every iteration needs an unlocked period, so seeding happens per
/// iteration and only the run itself is timed.
fn bench_full_run(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);

    for employees in [10_i64, 100, 1000] {
        group.throughput(Throughput::Elements(employees as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", employees),
            &employees,
            |b, &employees| {
                b.to_async(&rt).iter_custom(|iters| async move {
                    let mut total = Duration::ZERO;
                    for _ in 0..iters {
                        let (orchestrator, period_id) = seed_run(employees).await;
                        let start = Instant::now();
                        let report = orchestrator
                            .run(RunRequest::for_period(period_id, "bench@example.com"))
                            .await
                            .expect("Payroll run failed");
                        total += start.elapsed();
                        black_box(report);
                    }
                    total
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_single_payslip, bench_full_run);
criterion_main!(benches);
