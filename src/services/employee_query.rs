//! Region-scoped reads.
//!
//! Every employee read goes through `vw_employee_details`, which derives the
//! region from the employee's location, and is filtered by the caller's
//! `region_id`.

use sqlx::PgPool;
use tracing::debug;

use crate::database::models::{
    EmployeeDetails, EmployeePage, EmployeeRecord, EmployeeSummary, LookupItem, Lookups, RegionItem,
    SalaryHistoryEntry, SalarySnapshot,
};
use crate::database::Database;
use crate::services::employee_service::{EmployeeError, EMPLOYEE_STATUSES, EMPLOYMENT_TYPES, GENDERS};
use crate::types::{Pagination, RegionScope};

/// Upper bound on search hits returned in one response
const SEARCH_LIMIT: i64 = 50;

/// Resolve whether `employee_id` exists and lies inside `scope`.
pub async fn ensure_in_region(pool: &PgPool, scope: &RegionScope, employee_id: i32) -> Result<(), EmployeeError> {
    let region_id: Option<i32> = sqlx::query_scalar(
        "SELECT l.region_id
         FROM employee e
         JOIN location l ON l.location_id = e.location_id
         WHERE e.employee_id = $1",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    match region_id {
        None => Err(EmployeeError::NotFound(employee_id)),
        Some(region_id) if region_id != scope.region_id => Err(EmployeeError::AccessDenied(employee_id)),
        Some(_) => Ok(()),
    }
}

/// Escape LIKE metacharacters so `q` only ever matches literally.
pub fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct EmployeeQuery {
    db: Database,
}

impl EmployeeQuery {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self, scope: &RegionScope, pagination: Pagination) -> Result<EmployeePage, EmployeeError> {
        let pool = self.db.pool();

        let employees: Vec<EmployeeDetails> = sqlx::query_as(
            "SELECT * FROM vw_employee_details
             WHERE region_id = $1
             ORDER BY first_name, employee_id
             LIMIT $2 OFFSET $3",
        )
        .bind(scope.region_id)
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vw_employee_details WHERE region_id = $1")
            .bind(scope.region_id)
            .fetch_one(pool)
            .await?;

        debug!(region_id = scope.region_id, total, page = pagination.page, "Listed employees");

        Ok(EmployeePage {
            employees,
            total,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    pub async fn get(&self, scope: &RegionScope, employee_id: i32) -> Result<EmployeeRecord, EmployeeError> {
        let pool = self.db.pool();

        let details: EmployeeDetails = sqlx::query_as(
            "SELECT * FROM vw_employee_details WHERE employee_id = $1 AND region_id = $2",
        )
        .bind(employee_id)
        .bind(scope.region_id)
        .fetch_optional(pool)
        .await?
        .ok_or(EmployeeError::NotFound(employee_id))?;

        let salary: Option<SalarySnapshot> = sqlx::query_as(
            "SELECT ctc_lpa, salary_type, effective_from, currency, remarks, updated_at
             FROM employee_salary_current
             WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;

        Ok(EmployeeRecord { details, salary })
    }

    /// Case-insensitive substring match on first name, last name or email.
    /// A blank query returns no hits.
    pub async fn search(&self, scope: &RegionScope, q: &str) -> Result<Vec<EmployeeSummary>, EmployeeError> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let hits = sqlx::query_as(
            r"SELECT employee_id, first_name, last_name, email, image_url
              FROM vw_employee_details
              WHERE region_id = $1
                AND (first_name ILIKE $2 ESCAPE '\'
                     OR last_name ILIKE $2 ESCAPE '\'
                     OR email ILIKE $2 ESCAPE '\')
              ORDER BY first_name, employee_id
              LIMIT $3",
        )
        .bind(scope.region_id)
        .bind(like_pattern(q))
        .bind(SEARCH_LIMIT)
        .fetch_all(self.db.pool())
        .await?;

        Ok(hits)
    }

    /// Salary history, newest first.
    pub async fn salary_history(
        &self,
        scope: &RegionScope,
        employee_id: i32,
    ) -> Result<Vec<SalaryHistoryEntry>, EmployeeError> {
        let pool = self.db.pool();
        ensure_in_region(pool, scope, employee_id).await?;

        let history = sqlx::query_as(
            "SELECT history_id, employee_id, ctc_lpa, salary_type, currency,
                    effective_from, effective_to, remarks, created_at
             FROM employee_salary_history
             WHERE employee_id = $1
             ORDER BY effective_from DESC, history_id DESC",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await?;

        Ok(history)
    }

    /// Reference data for the create/edit forms. Locations are limited to the
    /// caller's region.
    pub async fn lookups(&self, scope: &RegionScope) -> Result<Lookups, EmployeeError> {
        let pool = self.db.pool();

        let companies = lookup(pool, "SELECT company_id AS id, company_name AS name FROM company ORDER BY company_name").await?;
        let departments =
            lookup(pool, "SELECT department_id AS id, department_name AS name FROM department ORDER BY department_name").await?;
        let designations =
            lookup(pool, "SELECT designation_id AS id, designation_name AS name FROM designation ORDER BY designation_name")
                .await?;
        let countries = lookup(pool, "SELECT country_id AS id, country_name AS name FROM country ORDER BY country_name").await?;

        let locations: Vec<LookupItem> = sqlx::query_as(
            "SELECT location_id AS id, city AS name FROM location WHERE region_id = $1 ORDER BY city",
        )
        .bind(scope.region_id)
        .fetch_all(pool)
        .await?;

        let regions: Vec<RegionItem> = sqlx::query_as(
            "SELECT region_id AS id, region_name AS name, country_id FROM region ORDER BY region_name",
        )
        .fetch_all(pool)
        .await?;

        Ok(Lookups {
            companies,
            locations,
            departments,
            designations,
            countries,
            regions,
            employment_types: EMPLOYMENT_TYPES,
            statuses: EMPLOYEE_STATUSES,
            genders: GENDERS,
        })
    }
}

async fn lookup(pool: &PgPool, sql: &'static str) -> Result<Vec<LookupItem>, sqlx::Error> {
    sqlx::query_as(sql).fetch_all(pool).await
}
