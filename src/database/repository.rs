use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Operator;

const OPERATOR_COLUMNS: &str =
    "hr_id, hr_name, username, password_hash, region_id, country_id, is_active";

/// Find an HR operator in the credential store by username
pub async fn find_operator_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Operator>, DatabaseError> {
    let operator = sqlx::query_as::<_, Operator>(&format!(
        "SELECT {OPERATOR_COLUMNS} FROM hr_login WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(operator)
}

pub async fn list_operators(pool: &PgPool) -> Result<Vec<Operator>, DatabaseError> {
    let operators = sqlx::query_as::<_, Operator>(&format!(
        "SELECT {OPERATOR_COLUMNS} FROM hr_login ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;

    Ok(operators)
}

/// Insert a new operator; the caller supplies an already hashed password
pub async fn insert_operator(
    pool: &PgPool,
    username: &str,
    hr_name: &str,
    password_hash: &str,
    region_id: i32,
    country_id: Option<i32>,
) -> Result<Operator, DatabaseError> {
    let operator = sqlx::query_as::<_, Operator>(&format!(
        "INSERT INTO hr_login (username, hr_name, password_hash, region_id, country_id, is_active)
         VALUES ($1, $2, $3, $4, $5, true)
         RETURNING {OPERATOR_COLUMNS}"
    ))
    .bind(username)
    .bind(hr_name)
    .bind(password_hash)
    .bind(region_id)
    .bind(country_id)
    .fetch_one(pool)
    .await?;

    Ok(operator)
}

/// Returns false when no operator has that username
pub async fn update_operator_password(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE hr_login SET password_hash = $2 WHERE username = $1")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns false when no operator has that username
pub async fn set_operator_active(
    pool: &PgPool,
    username: &str,
    is_active: bool,
) -> Result<bool, DatabaseError> {
    let result = sqlx::query("UPDATE hr_login SET is_active = $2 WHERE username = $1")
        .bind(username)
        .bind(is_active)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
