use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Claims, JwtError};
use crate::error::ApiError;
use crate::types::RegionScope;

/// Authenticated operator context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub hr_id: i32,
    pub hr_name: String,
    pub scope: RegionScope,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            hr_id: claims.hr_id,
            hr_name: claims.hr_name,
            scope: RegionScope {
                region_id: claims.region_id,
                country_id: claims.country_id,
            },
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts operator context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(token, &state.config.security).map_err(|e| match e {
        JwtError::InvalidToken(reason) => {
            tracing::debug!("Rejected bearer token: {}", reason);
            ApiError::unauthorized("Invalid or expired token")
        }
        other => ApiError::from(other),
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
