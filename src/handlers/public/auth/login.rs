// handlers/public/auth/login.rs - POST /api/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResult;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /api/login - Authenticate an HR operator and receive a JWT token
///
/// Expected Input:
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 3600,
///     "hr": { "hr_id": 1, "hr_name": "...", "username": "...", "region_id": 2, "country_id": 1, "is_active": true }
///   }
/// }
/// ```
///
/// 401 for an unknown username or wrong password, 403 for an inactive operator.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResult> {
    let Json(payload) = payload?;
    let username = payload
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::missing_field("username"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::missing_field("password"))?;

    let result = state.auth_service().login(&username, &password).await?;
    Ok(ApiResponse::success(result))
}
