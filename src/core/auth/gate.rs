//! Request authorization gate
//!
//! Extracts the bearer token from request headers, validates it, and checks
//! the role claim against the role a route requires. The gate trusts the
//! role embedded in the token; a stale role therefore persists until the
//! next refresh, which re-reads the user record.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::core::auth::jwt::{Claims, JwtError, JwtService};
use crate::core::db::models::Role;

/// Gate errors
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    Forbidden,
}

impl From<JwtError> for GateError {
    fn from(_: JwtError) -> Self {
        GateError::InvalidToken
    }
}

/// Whether a role held by a caller satisfies a route's requirement.
/// Admins can do everything a user can.
pub fn role_satisfies(held: Role, required: Role) -> bool {
    match required {
        Role::User => true,
        Role::Admin => held == Role::Admin,
    }
}

/// Pull the bearer token out of the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(GateError::MissingToken)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(GateError::MissingToken)
}

/// Validate the request's access token and check the role requirement.
/// Returns the validated claims for handlers that need the caller identity.
pub fn authorize(
    headers: &HeaderMap,
    jwt: &JwtService,
    required: Role,
) -> Result<Claims, GateError> {
    let token = extract_bearer_token(headers)?;
    let claims = jwt.validate_access_token(token)?;

    if !role_satisfies(claims.role, required) {
        return Err(GateError::Forbidden);
    }

    Ok(claims)
}
