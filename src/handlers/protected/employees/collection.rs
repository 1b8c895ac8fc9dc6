use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Serialize;

use crate::app::AppState;
use crate::database::models::EmployeePage;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::EmployeeInput;
use crate::types::{PageQuery, Pagination};

#[derive(Debug, Serialize)]
pub struct EmployeeCreated {
    pub employee_id: i32,
}

/// GET /api/employees?page&limit - Employees of the caller's region, by first name
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<EmployeePage> {
    let api = &state.config.api;
    let pagination = Pagination::from_query(&query, api.default_page_limit, api.max_page_limit);

    let page = state.employee_query().list(&user.scope, pagination).await?;
    Ok(ApiResponse::success(page))
}

/// POST /api/employees - Create an employee, with an optional opening salary
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<EmployeeCreated> {
    let Json(input) = payload?;
    let employee_id = state.employee_service().create(&user.scope, input).await?;
    tracing::debug!(hr_id = user.hr_id, employee_id, "Create requested by operator");

    Ok(ApiResponse::created(EmployeeCreated { employee_id }).with_message("Employee created successfully"))
}
