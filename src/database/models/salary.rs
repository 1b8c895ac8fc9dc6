use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Current compensation, one row per employee in `employee_salary_current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SalarySnapshot {
    pub ctc_lpa: Decimal,
    pub salary_type: String,
    pub effective_from: NaiveDate,
    pub currency: String,
    pub remarks: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Archived or open interval in `employee_salary_history`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SalaryHistoryEntry {
    pub history_id: i64,
    pub employee_id: i32,
    pub ctc_lpa: Decimal,
    pub salary_type: String,
    pub currency: String,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}
