use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::salary::SalarySnapshot;

/// One row of `vw_employee_details`: the employee with its reference data
/// resolved and the region derived through its location.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeDetails {
    pub employee_id: i32,
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
    pub company_name: String,
    pub location_id: i32,
    pub location: String,
    pub region_id: i32,
    pub region_name: String,
    pub country_id: Option<i32>,
    pub country_name: Option<String>,
    pub department_id: i32,
    pub department_name: String,
    pub designation_id: i32,
    pub designation_name: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-employee view: details plus the current salary snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeRecord {
    #[serde(flatten)]
    pub details: EmployeeDetails,
    pub salary: Option<SalarySnapshot>,
}

/// Compact search hit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeSummary {
    pub employee_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeePage {
    pub employees: Vec<EmployeeDetails>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}
