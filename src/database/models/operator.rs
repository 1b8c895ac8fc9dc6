use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// HR operator record from `hr_login`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Operator {
    pub hr_id: i32,
    pub hr_name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub region_id: i32,
    pub country_id: Option<i32>,
    pub is_active: bool,
}
