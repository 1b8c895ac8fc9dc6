use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{generate_jwt, verify_password, Claims, JwtError};
use crate::config::SecurityConfig;
use crate::database::models::Operator;
use crate::database::{repository, Database, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("HR is inactive")]
    AccountInactive,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub hr: Operator,
}

/// Unknown usernames and wrong passwords are indistinguishable to the
/// caller. The active flag is only consulted once the password matched.
pub fn check_credentials(operator: Option<Operator>, password: &str) -> Result<Operator, AuthError> {
    let operator = operator.ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &operator.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    if !operator.is_active {
        return Err(AuthError::AccountInactive);
    }
    Ok(operator)
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(db: Database, security: SecurityConfig) -> Self {
        Self { db, security }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let username = username.trim();
        let found = repository::find_operator_by_username(self.db.pool(), username).await?;

        let operator = check_credentials(found, password).inspect_err(|e| {
            warn!(username, "Login refused: {}", e);
        })?;

        let claims = Claims::new(
            operator.hr_id,
            operator.hr_name.clone(),
            operator.region_id,
            operator.country_id,
            self.security.jwt_expiry_hours,
        );
        let token = generate_jwt(&claims, &self.security)?;

        info!(hr_id = operator.hr_id, region_id = operator.region_id, "Operator logged in");

        Ok(LoginResult {
            token,
            expires_in: self.security.jwt_expiry_hours * 3600,
            hr: operator,
        })
    }
}
