use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - Service info
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "EMS API",
            "version": version,
            "description": "Region-scoped employee management backend",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "POST /api/login (public - token acquisition)",
                "employees": "/api/employees[/:id] (protected)",
                "search": "/api/employees/search?q= (protected)",
                "lookups": "/api/employees/lookups (protected)",
                "salary_history": "/api/employees/:id/salary-history (protected)",
                "documents": "/api/employee/:id/document[s], /api/employee/document/:id (protected)",
                "image": "/api/employee/:id/image (protected)",
                "uploads": "/uploads/:file (public)",
            }
        }
    }))
}

/// GET /health - Database reachability probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
