use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::Database;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AuthService, DocumentService, EmployeeQuery, EmployeeService};
use crate::storage::{BlobSink, LocalBlobSink};

/// Shared handler state. Cloned per request; every clone points at the same
/// pool and blob sink.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Database,
    pub blobs: Arc<dyn BlobSink>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        let blobs = Arc::new(LocalBlobSink::from_config(&config.storage));
        Self::with_blobs(config, db, blobs)
    }

    pub fn with_blobs(config: AppConfig, db: Database, blobs: Arc<dyn BlobSink>) -> Self {
        Self {
            config: Arc::new(config),
            db,
            blobs,
        }
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.db.clone(), self.config.security.clone())
    }

    pub fn employee_service(&self) -> EmployeeService {
        EmployeeService::new(self.db.clone(), self.blobs.clone())
    }

    pub fn employee_query(&self) -> EmployeeQuery {
        EmployeeQuery::new(self.db.clone())
    }

    pub fn document_service(&self) -> DocumentService {
        DocumentService::new(self.db.clone(), self.blobs.clone())
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .merge(public_api_routes())
        .merge(protected_routes(state.clone()));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(&config.storage.upload_dir))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_api_routes() -> Router<AppState> {
    use public::auth;

    Router::new().route("/login", post(auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{documents, employees};

    Router::new()
        // Employee records
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/lookups", get(employees::lookups))
        .route("/employees/search", get(employees::search))
        .route(
            "/employees/:id",
            get(employees::get).put(employees::update).delete(employees::delete),
        )
        .route("/employees/:id/salary-history", get(employees::salary_history))
        // Documents and profile photo
        .route("/employee/:id/document", post(documents::upload))
        .route("/employee/:id/documents", get(documents::list))
        .route("/employee/document/:id", delete(documents::delete))
        .route("/employee/:id/image", post(documents::upload_image))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
