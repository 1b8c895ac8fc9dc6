//! Employee record lifecycle.
//!
//! Create, update and delete each run as one transaction on a dedicated
//! connection and keep `employee`, `employee_salary_current` and
//! `employee_salary_history` consistent. Validation happens before the
//! transaction is opened; any failure inside it rolls everything back.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use sqlx::postgres::PgDatabaseError;
use sqlx::PgConnection;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::SalarySnapshot;
use crate::database::{rollback, Database};
use crate::services::employee_query::ensure_in_region;
use crate::services::salary::{self, SalaryInput, SalaryPlan, SalaryValues, ARCHIVE_REMARK};
use crate::storage::BlobSink;
use crate::types::{Operation, RegionScope};

pub const EMPLOYMENT_TYPES: &[&str] = &["FULL_TIME", "PART_TIME", "CONTRACT", "INTERN"];
pub const EMPLOYEE_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "ON_LEAVE", "TERMINATED"];
pub const GENDERS: &[&str] = &["MALE", "FEMALE", "OTHER"];

const DEFAULT_STATUS: &str = "ACTIVE";
const EMAIL_CONSTRAINT: &str = "employee_email_key";

/// Tables holding rows that reference an employee, cleared in this order
/// before the employee row itself.
pub const DEPENDENT_TABLES: [&str; 7] = [
    "attendance",
    "leave_request",
    "project_assignment",
    "performance_review",
    "employee_document",
    "employee_salary_history",
    "employee_salary_current",
];

#[derive(Debug, Error)]
pub enum EmployeeError {
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Employee {0} not found")]
    NotFound(i32),

    #[error("Employee {0} is outside the caller's region")]
    AccessDenied(i32),

    #[error("Location {0} is outside the caller's region")]
    ForeignLocation(i32),

    #[error("An employee with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Treat JSON null and blank strings as absent. Form-driven clients send ""
/// for untouched optional inputs.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Create/update request body. Every field is optional at the wire level so
/// that a missing required field is reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub joining_date: Option<NaiveDate>,
    pub employment_type: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company_id: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location_id: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub department_id: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub designation_id: Option<i32>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub ctc_lpa: Option<Decimal>,
    pub salary_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub effective_from: Option<NaiveDate>,
    pub currency: Option<String>,
    pub remarks: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joining_date: Option<NaiveDate>,
    pub employment_type: String,
    pub status: String,
    pub company_id: i32,
    pub location_id: i32,
    pub department_id: i32,
    pub designation_id: i32,
    pub salary: SalaryInput,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, EmployeeError> {
    value.ok_or(EmployeeError::MissingRequiredField(field))
}

impl EmployeeInput {
    /// Check required fields and normalize text. Enumerated values are left
    /// to the schema's CHECK constraints.
    pub fn validate(self) -> Result<ValidEmployee, EmployeeError> {
        let first_name = required(trimmed(self.first_name), "first_name")?;
        let last_name = required(trimmed(self.last_name), "last_name")?;
        let email = required(trimmed(self.email), "email")?.to_lowercase();
        let company_id = required(self.company_id, "company_id")?;
        let location_id = required(self.location_id, "location_id")?;
        let department_id = required(self.department_id, "department_id")?;
        let designation_id = required(self.designation_id, "designation_id")?;
        let employment_type = required(trimmed(self.employment_type), "employment_type")?.to_ascii_uppercase();

        Ok(ValidEmployee {
            first_name,
            last_name,
            email,
            phone: trimmed(self.phone),
            gender: trimmed(self.gender).map(|g| g.to_ascii_uppercase()),
            date_of_birth: self.date_of_birth,
            joining_date: self.joining_date,
            employment_type,
            status: trimmed(self.status)
                .map(|s| s.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            company_id,
            location_id,
            department_id,
            designation_id,
            salary: SalaryInput {
                ctc_lpa: self.ctc_lpa,
                salary_type: trimmed(self.salary_type),
                effective_from: self.effective_from,
                currency: trimmed(self.currency),
                remarks: trimmed(self.remarks),
            },
        })
    }
}

/// Map a failed statement onto the lifecycle taxonomy. Integrity and data
/// errors carry the database's message and detail; everything else stays an
/// opaque database error.
fn classify(err: sqlx::Error, email: &str) -> EmployeeError {
    let violation = match &err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            if code == "23505" && db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                return EmployeeError::DuplicateEmail(email.to_string());
            }
            if code.starts_with("23") || code.starts_with("22") {
                let detail = db_err
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.detail())
                    .map(|detail| format!("{} ({})", db_err.message(), detail))
                    .unwrap_or_else(|| db_err.message().to_string());
                Some(detail)
            } else {
                None
            }
        }
        _ => None,
    };

    match violation {
        Some(detail) => EmployeeError::ConstraintViolation(detail),
        None => EmployeeError::Database(err),
    }
}

#[derive(Clone)]
pub struct EmployeeService {
    db: Database,
    blobs: Arc<dyn BlobSink>,
}

impl EmployeeService {
    pub fn new(db: Database, blobs: Arc<dyn BlobSink>) -> Self {
        Self { db, blobs }
    }

    /// Insert a new employee and, when a positive salary is supplied, its
    /// snapshot plus an open-ended history row.
    pub async fn create(&self, scope: &RegionScope, input: EmployeeInput) -> Result<i32, EmployeeError> {
        let employee = input.validate()?;

        let mut tx = self.db.begin().await?;
        match Self::create_within(&mut tx, scope, &employee, salary::today()).await {
            Ok(employee_id) => {
                tx.commit().await?;
                info!(employee_id, "Employee created");
                Ok(employee_id)
            }
            Err(e) => {
                rollback(tx, "employee create").await;
                warn!("Employee {} failed: {}", Operation::Create, e);
                Err(e)
            }
        }
    }

    async fn create_within(
        conn: &mut PgConnection,
        scope: &RegionScope,
        employee: &ValidEmployee,
        today: NaiveDate,
    ) -> Result<i32, EmployeeError> {
        ensure_location_in_scope(conn, scope, employee.location_id).await?;

        let employee_id: i32 = sqlx::query_scalar(
            "INSERT INTO employee (
                first_name, last_name, email, phone, gender, date_of_birth, joining_date,
                employment_type, status, company_id, location_id, department_id, designation_id
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING employee_id",
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.gender)
        .bind(employee.date_of_birth)
        .bind(employee.joining_date)
        .bind(&employee.employment_type)
        .bind(&employee.status)
        .bind(employee.company_id)
        .bind(employee.location_id)
        .bind(employee.department_id)
        .bind(employee.designation_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| classify(e, &employee.email))?;

        if let Some(values) = salary::plan_create(&employee.salary, employee.joining_date, today) {
            insert_snapshot(conn, employee_id, &values).await?;
            insert_open_history(conn, employee_id, &values).await?;
        }

        Ok(employee_id)
    }

    /// Overwrite an employee's mutable fields and reconcile the salary ledger.
    pub async fn update(
        &self,
        scope: &RegionScope,
        employee_id: i32,
        input: EmployeeInput,
    ) -> Result<i32, EmployeeError> {
        let employee = input.validate()?;
        ensure_in_region(self.db.pool(), scope, employee_id).await?;

        let mut tx = self.db.begin().await?;
        match Self::update_within(&mut tx, scope, employee_id, &employee, salary::today()).await {
            Ok(plan) => {
                tx.commit().await?;
                info!(employee_id, salary = plan, "Employee updated");
                Ok(employee_id)
            }
            Err(e) => {
                rollback(tx, "employee update").await;
                warn!(employee_id, "Employee {} failed: {}", Operation::Update, e);
                Err(e)
            }
        }
    }

    /// Returns the label of the salary plan that was applied.
    async fn update_within(
        conn: &mut PgConnection,
        scope: &RegionScope,
        employee_id: i32,
        employee: &ValidEmployee,
        today: NaiveDate,
    ) -> Result<&'static str, EmployeeError> {
        ensure_location_in_scope(conn, scope, employee.location_id).await?;

        // Takes the employee row lock; concurrent updates of the same employee
        // queue here until this transaction ends.
        let updated = sqlx::query(
            "UPDATE employee SET
                first_name = $2, last_name = $3, email = $4, phone = $5, gender = $6,
                date_of_birth = $7, joining_date = $8, employment_type = $9, status = $10,
                company_id = $11, location_id = $12, department_id = $13, designation_id = $14,
                updated_at = now()
             WHERE employee_id = $1",
        )
        .bind(employee_id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.gender)
        .bind(employee.date_of_birth)
        .bind(employee.joining_date)
        .bind(&employee.employment_type)
        .bind(&employee.status)
        .bind(employee.company_id)
        .bind(employee.location_id)
        .bind(employee.department_id)
        .bind(employee.designation_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| classify(e, &employee.email))?;

        if updated.rows_affected() == 0 {
            return Err(EmployeeError::NotFound(employee_id));
        }

        if !employee.salary.is_reconcilable() {
            return Ok(SalaryPlan::Skip.label());
        }

        let current: Option<SalarySnapshot> = sqlx::query_as(
            "SELECT ctc_lpa, salary_type, effective_from, currency, remarks, updated_at
             FROM employee_salary_current
             WHERE employee_id = $1
             FOR UPDATE",
        )
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;

        let plan = salary::plan_update(current.as_ref(), &employee.salary);
        let label = plan.label();

        match plan {
            SalaryPlan::Skip => {}
            SalaryPlan::Open(values) => {
                insert_snapshot(conn, employee_id, &values).await?;
                insert_open_history(conn, employee_id, &values).await?;
            }
            SalaryPlan::Touch { remarks } => {
                sqlx::query(
                    "UPDATE employee_salary_current
                     SET remarks = COALESCE($2, remarks), updated_at = now()
                     WHERE employee_id = $1",
                )
                .bind(employee_id)
                .bind(remarks)
                .execute(&mut *conn)
                .await?;
            }
            SalaryPlan::Revise { archived, next } => {
                archive_snapshot(conn, employee_id, &archived, today).await?;
                sqlx::query(
                    "UPDATE employee_salary_current
                     SET ctc_lpa = $2, salary_type = $3, effective_from = $4, currency = $5,
                         remarks = $6, updated_at = now()
                     WHERE employee_id = $1",
                )
                .bind(employee_id)
                .bind(next.ctc_lpa)
                .bind(&next.salary_type)
                .bind(next.effective_from)
                .bind(&next.currency)
                .bind(&next.remarks)
                .execute(&mut *conn)
                .await
                .map_err(|e| classify(e, &employee.email))?;
            }
        }

        Ok(label)
    }

    /// Remove an employee and every dependent row. Stored document files are
    /// cleaned up after the commit on a best-effort basis.
    pub async fn delete(&self, scope: &RegionScope, employee_id: i32) -> Result<i32, EmployeeError> {
        ensure_in_region(self.db.pool(), scope, employee_id).await?;

        let mut tx = self.db.begin().await?;
        let file_urls = match Self::delete_within(&mut tx, employee_id).await {
            Ok(urls) => {
                tx.commit().await?;
                urls
            }
            Err(e) => {
                rollback(tx, "employee delete").await;
                warn!(employee_id, "Employee {} failed: {}", Operation::Delete, e);
                return Err(e);
            }
        };
        info!(employee_id, documents = file_urls.len(), "Employee deleted");

        for url in file_urls {
            let outcome = self.blobs.delete(&url).await;
            if !outcome.is_removed() {
                warn!(employee_id, "Document file {} not removed: {:?}", url, outcome);
            }
        }

        Ok(employee_id)
    }

    /// Run the ordered delete statements on an open transaction. Returns the
    /// file URLs of the employee's active documents.
    async fn delete_within(conn: &mut PgConnection, employee_id: i32) -> Result<Vec<String>, EmployeeError> {
        let file_urls: Vec<String> = sqlx::query_scalar(
            "SELECT file_url FROM employee_document WHERE employee_id = $1 AND is_active",
        )
        .bind(employee_id)
        .fetch_all(&mut *conn)
        .await?;

        for table in DEPENDENT_TABLES {
            sqlx::query(&format!("DELETE FROM {table} WHERE employee_id = $1"))
                .bind(employee_id)
                .execute(&mut *conn)
                .await?;
        }

        let deleted = sqlx::query("DELETE FROM employee WHERE employee_id = $1")
            .bind(employee_id)
            .execute(&mut *conn)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(EmployeeError::NotFound(employee_id));
        }

        Ok(file_urls)
    }
}

/// An employee may only be placed at a location of the caller's region.
/// Unknown locations are left to the foreign key.
async fn ensure_location_in_scope(
    conn: &mut PgConnection,
    scope: &RegionScope,
    location_id: i32,
) -> Result<(), EmployeeError> {
    let region_id: Option<i32> = sqlx::query_scalar("SELECT region_id FROM location WHERE location_id = $1")
        .bind(location_id)
        .fetch_optional(&mut *conn)
        .await?;

    match region_id {
        Some(region_id) if region_id != scope.region_id => Err(EmployeeError::ForeignLocation(location_id)),
        _ => Ok(()),
    }
}

async fn insert_snapshot(conn: &mut PgConnection, employee_id: i32, values: &SalaryValues) -> Result<(), EmployeeError> {
    sqlx::query(
        "INSERT INTO employee_salary_current
            (employee_id, ctc_lpa, salary_type, effective_from, currency, remarks, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, now())",
    )
    .bind(employee_id)
    .bind(values.ctc_lpa)
    .bind(&values.salary_type)
    .bind(values.effective_from)
    .bind(&values.currency)
    .bind(&values.remarks)
    .execute(&mut *conn)
    .await
    .map_err(|e| classify(e, ""))?;
    Ok(())
}

async fn insert_open_history(conn: &mut PgConnection, employee_id: i32, values: &SalaryValues) -> Result<(), EmployeeError> {
    sqlx::query(
        "INSERT INTO employee_salary_history
            (employee_id, ctc_lpa, salary_type, currency, effective_from, effective_to, remarks)
         VALUES ($1, $2, $3, $4, $5, NULL, $6)",
    )
    .bind(employee_id)
    .bind(values.ctc_lpa)
    .bind(&values.salary_type)
    .bind(&values.currency)
    .bind(values.effective_from)
    .bind(&values.remarks)
    .execute(&mut *conn)
    .await
    .map_err(|e| classify(e, ""))?;
    Ok(())
}

/// Copy the superseded snapshot into history, closed at `closed_on`.
async fn archive_snapshot(
    conn: &mut PgConnection,
    employee_id: i32,
    archived: &SalarySnapshot,
    closed_on: NaiveDate,
) -> Result<(), EmployeeError> {
    sqlx::query(
        "INSERT INTO employee_salary_history
            (employee_id, ctc_lpa, salary_type, currency, effective_from, effective_to, remarks)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(employee_id)
    .bind(archived.ctc_lpa)
    .bind(&archived.salary_type)
    .bind(&archived.currency)
    .bind(archived.effective_from)
    .bind(closed_on)
    .bind(ARCHIVE_REMARK)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
