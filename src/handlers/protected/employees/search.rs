use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{EmployeeSummary, Lookups};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/employees/search?q= - Substring match on name or email
pub async fn search(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<EmployeeSummary>> {
    let hits = state.employee_query().search(&user.scope, &query.q).await?;
    Ok(ApiResponse::success(hits))
}

/// GET /api/employees/lookups - Dropdown data for the employee forms
pub async fn lookups(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Lookups> {
    let lookups = state.employee_query().lookups(&user.scope).await?;
    Ok(ApiResponse::success(lookups))
}
