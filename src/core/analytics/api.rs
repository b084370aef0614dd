//! Analytics HTTP API
//!
//! Admin-only operational metrics over the auth data: account totals, live
//! sessions and recent login activity. Access goes through the same role
//! gate as the rest of the API.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::core::auth::gate::authorize;
use crate::core::auth::jwt::JwtService;
use crate::core::auth::service::AuthError;
use crate::core::db::models::Role;
use crate::core::db::repositories::{
    LoginAttemptRepository, SessionRepository, UserRepository,
};

/// Role required to read the analytics surface
const REQUIRED_ROLE: Role = Role::Admin;

/// Metrics snapshot returned by `/api/analytics/metrics`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_users: i64,
    pub locked_users: i64,
    pub active_sessions: i64,
    pub login_attempts_24h: i64,
    pub failed_logins_24h: i64,
}

#[derive(Clone)]
pub struct AnalyticsState {
    users: UserRepository,
    sessions: SessionRepository,
    attempts: LoginAttemptRepository,
    jwt: JwtService,
}

impl AnalyticsState {
    pub fn new(pool: PgPool, jwt: JwtService) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            attempts: LoginAttemptRepository::new(pool),
            jwt,
        }
    }
}

/// Build the `/api/analytics` router
pub fn analytics_router(state: AnalyticsState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn metrics(
    State(state): State<AnalyticsState>,
    headers: HeaderMap,
) -> Result<Json<MetricsSnapshot>, AuthError> {
    authorize(&headers, &state.jwt, REQUIRED_ROLE)?;

    let since = Utc::now() - Duration::hours(24);

    let total_users = state.users.count().await?;
    let locked_users = state.users.count_locked().await?;
    let active_sessions = state.sessions.count_active().await?;
    let login_attempts_24h = state.attempts.count_all_since(since, false).await?;
    let failed_logins_24h = state.attempts.count_all_since(since, true).await?;

    Ok(Json(MetricsSnapshot {
        total_users,
        locked_users,
        active_sessions,
        login_attempts_24h,
        failed_logins_24h,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot_serialization() {
        let snapshot = MetricsSnapshot {
            total_users: 42,
            locked_users: 1,
            active_sessions: 17,
            login_attempts_24h: 120,
            failed_logins_24h: 9,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["total_users"], 42);
        assert_eq!(json["failed_logins_24h"], 9);
    }

    #[test]
    fn test_attempt_store_outage_maps_to_service_unavailable() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        use crate::core::db::repositories::login_attempt::LoginAttemptRepositoryError;

        // A pool outage while counting attempts is a 503, not a 500
        let err = AuthError::from(LoginAttemptRepositoryError::DatabaseUnavailable(
            "pool timed out".to_string(),
        ));
        assert!(matches!(err, AuthError::DatabaseUnavailable(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
