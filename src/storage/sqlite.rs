use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::{
    AttendanceSource, EmployeeRoster, OvertimeSource, PayrollStore, PeriodStore,
    ReimbursementSource, StoreError, StoreResult, group_by_employee,
};
use crate::models::{
    AttendanceRecord, Audit, DateRange, Employee, EmployeeId, NewPayroll, NewPayrollPeriod,
    OvertimeRecord, Payroll, PayrollPeriod, PeriodId, ReimbursementRecord,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        salary TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll_periods (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        locked INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        date TEXT NOT NULL,
        UNIQUE (employee_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS overtime (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        date TEXT NOT NULL,
        hours TEXT NOT NULL,
        UNIQUE (employee_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reimbursements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payrolls (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL REFERENCES employees(id),
        period_id INTEGER NOT NULL REFERENCES payroll_periods(id),
        payslip TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        created_by TEXT NOT NULL,
        updated_by TEXT NOT NULL,
        UNIQUE (employee_id, period_id)
    )
    "#,
];

/// A SQLite-backed store implementing every storage port with `sqlx`.
///
/// Dates are stored as ISO-8601 text, money and hours as decimal text, and
/// payslips as JSON. [`PayrollStore::commit_period_run`] runs the
/// conditional lock and all inserts inside one transaction.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url`, creating the database file if needed, and sets up
    /// the schema.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool keeps exactly one connection alive for its whole lifetime so
    /// the database is not dropped between queries.
    pub async fn connect_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(Self { pool })
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Adds or replaces an employee on the roster.
    pub async fn add_employee(&self, employee: Employee) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO employees \
             (id, name, email, salary, created_at, updated_at, created_by, updated_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(employee.id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(employee.salary.to_string())
        .bind(employee.audit.created_at.to_rfc3339())
        .bind(employee.audit.updated_at.to_rfc3339())
        .bind(&employee.audit.created_by)
        .bind(&employee.audit.updated_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Records a day of attendance.
    pub async fn record_attendance(&self, record: AttendanceRecord) -> StoreResult<()> {
        self.ensure_writable(record.employee_id, record.date).await?;
        sqlx::query("INSERT INTO attendance (employee_id, date) VALUES (?, ?)")
            .bind(record.employee_id)
            .bind(record.date.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                unique_violation_as(e, || {
                    format!(
                        "attendance already recorded for employee {} on {}",
                        record.employee_id, record.date
                    )
                })
            })?;
        Ok(())
    }

    /// Records overtime hours.
    pub async fn record_overtime(&self, record: OvertimeRecord) -> StoreResult<()> {
        record.validate().map_err(|e| StoreError::Rejected {
            message: e.to_string(),
        })?;
        self.ensure_writable(record.employee_id, record.date).await?;
        sqlx::query("INSERT INTO overtime (employee_id, date, hours) VALUES (?, ?, ?)")
            .bind(record.employee_id)
            .bind(record.date.to_string())
            .bind(record.hours.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                unique_violation_as(e, || {
                    format!(
                        "overtime already recorded for employee {} on {}",
                        record.employee_id, record.date
                    )
                })
            })?;
        Ok(())
    }

    /// Records a reimbursement.
    pub async fn record_reimbursement(&self, record: ReimbursementRecord) -> StoreResult<()> {
        record.validate().map_err(|e| StoreError::Rejected {
            message: e.to_string(),
        })?;
        self.ensure_writable(record.employee_id, record.date).await?;
        sqlx::query(
            "INSERT INTO reimbursements (employee_id, date, amount, description) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(record.employee_id)
        .bind(record.date.to_string())
        .bind(record.amount.to_string())
        .bind(&record.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ensure_writable(&self, employee_id: EmployeeId, date: NaiveDate) -> StoreResult<()> {
        let known = sqlx::query("SELECT 1 FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?;
        if known.is_none() {
            return Err(StoreError::Rejected {
                message: format!("unknown employee {}", employee_id),
            });
        }

        let day = date.to_string();
        let locked = sqlx::query(
            "SELECT id FROM payroll_periods \
             WHERE locked = 1 AND start_date <= ? AND end_date >= ? LIMIT 1",
        )
        .bind(&day)
        .bind(&day)
        .fetch_optional(&self.pool)
        .await?;
        match locked {
            Some(row) => Err(StoreError::PeriodLocked {
                period_id: row.try_get("id")?,
            }),
            None => Ok(()),
        }
    }
}

fn unique_violation_as(error: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Rejected {
            message: message(),
        },
        _ => StoreError::Database(error),
    }
}

fn parse_date(table: &'static str, value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::from_str(value).map_err(|e| StoreError::Corrupt {
        table,
        message: format!("bad date '{}': {}", value, e),
    })
}

fn parse_decimal(table: &'static str, value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|e| StoreError::Corrupt {
        table,
        message: format!("bad decimal '{}': {}", value, e),
    })
}

fn parse_timestamp(table: &'static str, value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            table,
            message: format!("bad timestamp '{}': {}", value, e),
        })
}

fn audit_from_row(table: &'static str, row: &SqliteRow) -> StoreResult<Audit> {
    Ok(Audit {
        created_at: parse_timestamp(table, row.try_get("created_at")?)?,
        updated_at: parse_timestamp(table, row.try_get("updated_at")?)?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
    })
}

fn employee_from_row(row: &SqliteRow) -> StoreResult<Employee> {
    Ok(Employee {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        salary: parse_decimal("employees", row.try_get("salary")?)?,
        audit: audit_from_row("employees", row)?,
    })
}

fn period_from_row(row: &SqliteRow) -> StoreResult<PayrollPeriod> {
    Ok(PayrollPeriod {
        id: row.try_get("id")?,
        start_date: parse_date("payroll_periods", row.try_get("start_date")?)?,
        end_date: parse_date("payroll_periods", row.try_get("end_date")?)?,
        locked: row.try_get("locked")?,
        audit: audit_from_row("payroll_periods", row)?,
    })
}

fn payroll_from_row(row: &SqliteRow) -> StoreResult<Payroll> {
    let payslip: &str = row.try_get("payslip")?;
    Ok(Payroll {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        period_id: row.try_get("period_id")?,
        payslip: serde_json::from_str(payslip).map_err(|e| StoreError::Corrupt {
            table: "payrolls",
            message: e.to_string(),
        })?,
        audit: audit_from_row("payrolls", row)?,
    })
}

const PERIOD_COLUMNS: &str =
    "id, start_date, end_date, locked, created_at, updated_at, created_by, updated_by";

const PAYROLL_COLUMNS: &str =
    "id, employee_id, period_id, payslip, created_at, updated_at, created_by, updated_by";

#[async_trait]
impl EmployeeRoster for SqliteStore {
    async fn all_employees(&self) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query(
            "SELECT id, name, email, salary, created_at, updated_at, created_by, updated_by \
             FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(employee_from_row).collect()
    }

    async fn employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        let row = sqlx::query(
            "SELECT id, name, email, salary, created_at, updated_at, created_by, updated_by \
             FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(employee_from_row).transpose()
    }
}

#[async_trait]
impl AttendanceSource for SqliteStore {
    async fn attendance_counts(&self, range: DateRange) -> StoreResult<HashMap<EmployeeId, u32>> {
        let rows = sqlx::query(
            "SELECT employee_id, COUNT(*) AS days FROM attendance \
             WHERE date BETWEEN ? AND ? GROUP BY employee_id",
        )
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<EmployeeId, u32> = HashMap::with_capacity(rows.len());
        for row in &rows {
            let days: i64 = row.try_get("days")?;
            let days = u32::try_from(days).map_err(|e| StoreError::Corrupt {
                table: "attendance",
                message: e.to_string(),
            })?;
            counts.insert(row.try_get("employee_id")?, days);
        }
        Ok(counts)
    }
}

#[async_trait]
impl OvertimeSource for SqliteStore {
    async fn overtime_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<OvertimeRecord>>> {
        let rows = sqlx::query(
            "SELECT employee_id, date, hours FROM overtime \
             WHERE date BETWEEN ? AND ? ORDER BY employee_id, date",
        )
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| -> StoreResult<OvertimeRecord> {
                Ok(OvertimeRecord {
                    employee_id: row.try_get("employee_id")?,
                    date: parse_date("overtime", row.try_get("date")?)?,
                    hours: parse_decimal("overtime", row.try_get("hours")?)?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(group_by_employee(records, |o| o.employee_id))
    }
}

#[async_trait]
impl ReimbursementSource for SqliteStore {
    async fn reimbursements_by_employee(
        &self,
        range: DateRange,
    ) -> StoreResult<HashMap<EmployeeId, Vec<ReimbursementRecord>>> {
        let rows = sqlx::query(
            "SELECT employee_id, date, amount, description FROM reimbursements \
             WHERE date BETWEEN ? AND ? ORDER BY employee_id, date, id",
        )
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(|row| -> StoreResult<ReimbursementRecord> {
                Ok(ReimbursementRecord {
                    employee_id: row.try_get("employee_id")?,
                    date: parse_date("reimbursements", row.try_get("date")?)?,
                    amount: parse_decimal("reimbursements", row.try_get("amount")?)?,
                    description: row.try_get("description")?,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(group_by_employee(records, |r| r.employee_id))
    }
}

#[async_trait]
impl PeriodStore for SqliteStore {
    async fn period_by_id(&self, id: PeriodId) -> StoreResult<Option<PayrollPeriod>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payroll_periods WHERE id = ?",
            PERIOD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(period_from_row).transpose()
    }

    async fn period_containing(&self, date: NaiveDate) -> StoreResult<Option<PayrollPeriod>> {
        let day = date.to_string();
        let row = sqlx::query(&format!(
            "SELECT {} FROM payroll_periods WHERE start_date <= ? AND end_date >= ? \
             ORDER BY id LIMIT 1",
            PERIOD_COLUMNS
        ))
        .bind(&day)
        .bind(&day)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(period_from_row).transpose()
    }

    async fn create_period(&self, period: NewPayrollPeriod) -> StoreResult<PayrollPeriod> {
        let range = period.range();
        if range.start > range.end {
            return Err(StoreError::Rejected {
                message: format!("period {} ends before it starts", range),
            });
        }

        let mut tx = self.pool.begin().await?;
        let overlapping = sqlx::query(
            "SELECT id FROM payroll_periods WHERE start_date <= ? AND end_date >= ? LIMIT 1",
        )
        .bind(range.end.to_string())
        .bind(range.start.to_string())
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(row) = overlapping {
            return Err(StoreError::PeriodOverlap {
                range,
                existing: row.try_get("id")?,
            });
        }

        let audit = Audit::created_by(&period.created_by, Utc::now());
        let result = sqlx::query(
            "INSERT INTO payroll_periods \
             (start_date, end_date, locked, created_at, updated_at, created_by, updated_by) \
             VALUES (?, ?, 0, ?, ?, ?, ?)",
        )
        .bind(range.start.to_string())
        .bind(range.end.to_string())
        .bind(audit.created_at.to_rfc3339())
        .bind(audit.updated_at.to_rfc3339())
        .bind(&audit.created_by)
        .bind(&audit.updated_by)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(PayrollPeriod {
            id: result.last_insert_rowid(),
            start_date: range.start,
            end_date: range.end,
            locked: false,
            audit,
        })
    }
}

#[async_trait]
impl PayrollStore for SqliteStore {
    async fn commit_period_run(
        &self,
        period_id: PeriodId,
        payrolls: Vec<NewPayroll>,
        actor: &str,
    ) -> StoreResult<Vec<Payroll>> {
        let mut seen = HashSet::with_capacity(payrolls.len());
        for payroll in &payrolls {
            if payroll.period_id != period_id {
                return Err(StoreError::Rejected {
                    message: format!(
                        "payroll for employee {} targets period {}, not {}",
                        payroll.employee_id, payroll.period_id, period_id
                    ),
                });
            }
            if !seen.insert(payroll.employee_id) {
                return Err(StoreError::DuplicatePayroll {
                    employee_id: payroll.employee_id,
                    period_id,
                });
            }
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Conditional lock first: a concurrent run that already locked the
        // period leaves zero rows affected here.
        let locked = sqlx::query(
            "UPDATE payroll_periods SET locked = 1, updated_at = ?, updated_by = ? \
             WHERE id = ? AND locked = 0",
        )
        .bind(now.to_rfc3339())
        .bind(actor)
        .bind(period_id)
        .execute(&mut *tx)
        .await?;

        if locked.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM payroll_periods WHERE id = ?")
                .bind(period_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => StoreError::PeriodLocked { period_id },
                None => StoreError::PeriodNotFound { period_id },
            });
        }

        let mut written = Vec::with_capacity(payrolls.len());
        for payroll in payrolls {
            let payslip = serde_json::to_string(&payroll.payslip).map_err(|e| {
                StoreError::Rejected {
                    message: format!("payslip for employee {}: {}", payroll.employee_id, e),
                }
            })?;
            let audit = Audit::created_by(&payroll.created_by, now);
            let result = sqlx::query(
                "INSERT INTO payrolls \
                 (employee_id, period_id, payslip, created_at, updated_at, created_by, updated_by) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(payroll.employee_id)
            .bind(period_id)
            .bind(payslip)
            .bind(audit.created_at.to_rfc3339())
            .bind(audit.updated_at.to_rfc3339())
            .bind(&audit.created_by)
            .bind(&audit.updated_by)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicatePayroll {
                        employee_id: payroll.employee_id,
                        period_id,
                    }
                }
                _ => StoreError::Database(e),
            })?;

            written.push(Payroll {
                id: result.last_insert_rowid(),
                employee_id: payroll.employee_id,
                period_id,
                payslip: payroll.payslip,
                audit,
            });
        }

        tx.commit().await?;
        debug!(period_id, rows = written.len(), "payroll batch committed");
        Ok(written)
    }

    async fn payrolls_for_period(&self, period_id: PeriodId) -> StoreResult<Vec<Payroll>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payrolls WHERE period_id = ? ORDER BY employee_id",
            PAYROLL_COLUMNS
        ))
        .bind(period_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(payroll_from_row).collect()
    }

    async fn payroll_for_employee(
        &self,
        employee_id: EmployeeId,
        period_id: PeriodId,
    ) -> StoreResult<Option<Payroll>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payrolls WHERE employee_id = ? AND period_id = ?",
            PAYROLL_COLUMNS
        ))
        .bind(employee_id)
        .bind(period_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(payroll_from_row).transpose()
    }
}
