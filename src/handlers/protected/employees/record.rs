use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::{EmployeeRecord, SalaryHistoryEntry};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::EmployeeInput;

#[derive(Debug, Serialize)]
pub struct EmployeeRef {
    pub employee_id: i32,
}

/// GET /api/employees/:id - Full detail row plus the current salary snapshot
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<EmployeeRecord> {
    let record = state.employee_query().get(&user.scope, id).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/employees/:id - Overwrite the employee and reconcile salary
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<EmployeeRef> {
    let Json(input) = payload?;
    let employee_id = state.employee_service().update(&user.scope, id, input).await?;
    Ok(ApiResponse::success(EmployeeRef { employee_id }).with_message("Employee updated successfully"))
}

/// DELETE /api/employees/:id - Remove the employee and every dependent row
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<EmployeeRef> {
    let employee_id = state.employee_service().delete(&user.scope, id).await?;
    Ok(ApiResponse::success(EmployeeRef { employee_id }).with_message("Employee deleted successfully"))
}

/// GET /api/employees/:id/salary-history - Salary intervals, newest first
pub async fn salary_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<SalaryHistoryEntry>> {
    let history = state.employee_query().salary_history(&user.scope, id).await?;
    Ok(ApiResponse::success(history))
}
