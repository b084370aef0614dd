//! Authentication HTTP API
//!
//! Axum handlers and the `/api/auth` router. Every error leaves the service
//! as the same JSON envelope:
//!
//! ```json
//! { "success": false, "error": "...", "errorCode": "..." }
//! ```

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::core::auth::gate::{GateError, authorize};
use crate::core::auth::jwt::TokenPair;
use crate::core::auth::service::{AuthError, AuthService};
use crate::core::db::models::{Role, UserResponse};

// ============================================================================
// Error envelope
// ============================================================================

/// JSON error envelope shared by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: String,
    #[serde(rename = "errorCode")]
    pub error_code: String,
}

impl ErrorEnvelope {
    fn new(error: impl Into<String>, error_code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_code: error_code.into(),
        }
    }
}

/// HTTP status for each auth error kind
pub fn status_for(err: &AuthError) -> StatusCode {
    match err {
        AuthError::ValidationError(_) | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::SessionExpired => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::DuplicateEmail => StatusCode::CONFLICT,
        AuthError::AccountLocked => StatusCode::LOCKED,
        AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AuthError::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        // Internal detail stays in the logs, not in the response body
        if let AuthError::Internal(detail) | AuthError::DatabaseUnavailable(detail) = &self {
            error!(%detail, code = self.error_code(), "Auth request failed");
        }

        let body = ErrorEnvelope::new(self.to_string(), self.error_code());
        (status, Json(body)).into_response()
    }
}

impl From<GateError> for AuthError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::MissingToken | GateError::InvalidToken => AuthError::InvalidToken,
            GateError::Forbidden => AuthError::Forbidden,
        }
    }
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the `/api/auth` router
pub fn auth_router(service: AuthService) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/password", post(change_password))
        .route("/me", get(me))
        .with_state(service)
}

// ============================================================================
// Handlers
// ============================================================================

async fn register(
    State(service): State<AuthService>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let auth = service
        .register(&req.email, &req.password, &req.first_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: auth.user,
            tokens: auth.tokens,
        }),
    ))
}

async fn login(
    State(service): State<AuthService>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let ip = client_ip(&headers);
    let auth = service
        .login(&req.email, &req.password, req.remember_me, ip.as_deref())
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        user: auth.user,
        tokens: auth.tokens,
    }))
}

async fn refresh(
    State(service): State<AuthService>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let tokens = service.refresh(&req.refresh_token).await?;

    Ok(Json(TokenResponse {
        success: true,
        tokens,
    }))
}

async fn logout(
    State(service): State<AuthService>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service.logout(&req.refresh_token).await?;
    Ok(MessageResponse::ok("Logged out"))
}

/// Always reports success so responses cannot reveal which emails exist
async fn forgot_password(
    State(service): State<AuthService>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    // TODO: hand the token to the mailer once the notification service lands
    let _token = service.request_password_reset(&req.email).await?;

    Ok(MessageResponse::ok(
        "If that email is registered, a reset link has been sent",
    ))
}

async fn reset_password(
    State(service): State<AuthService>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    service
        .confirm_password_reset(&req.token, &req.new_password)
        .await?;
    Ok(MessageResponse::ok("Password has been reset"))
}

async fn change_password(
    State(service): State<AuthService>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let claims = authorize(&headers, service.jwt(), Role::User)?;
    let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

    service
        .change_password(user_id, &req.current_password, &req.new_password)
        .await?;
    Ok(MessageResponse::ok("Password changed"))
}

async fn me(
    State(service): State<AuthService>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, AuthError> {
    let claims = authorize(&headers, service.jwt(), Role::User)?;
    let user_id = claims.user_id().map_err(|_| AuthError::InvalidToken)?;

    let user = service.get_current_user(user_id).await?;
    Ok(Json(user))
}

/// Best-effort client address from proxy headers
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
