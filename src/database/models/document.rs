use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const PROFILE_PHOTO: &str = "PROFILE_PHOTO";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub document_id: i32,
    pub employee_id: i32,
    pub document_type: String,
    pub document_name: String,
    pub file_url: String,
    pub file_sha256: Option<String>,
    pub is_active: bool,
    pub uploaded_at: DateTime<Utc>,
}
