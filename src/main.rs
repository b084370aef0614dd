//! Fluentia server binary
//!
//! Wires configuration, the database pool, the auth and analytics routers
//! and the HTTP listener together.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use fluentia::analytics::{AnalyticsState, analytics_router};
use fluentia::auth::rate_limit::{FailedLoginLimiter, MemoryCounterStore};
use fluentia::auth::{AuthService, JwtService, auth_router};
use fluentia::config::AppConfig;
use fluentia::db::pool::{DbConfig, create_pool_with_migrations, health_check};
use sqlx::PgPool;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();

    let db_config = DbConfig::from_env()?;
    let pool = create_pool_with_migrations(&db_config).await?;
    info!("Database pool ready");

    let jwt = JwtService::from_env()?;
    let limiter = FailedLoginLimiter::new(
        Arc::new(MemoryCounterStore::new()),
        config.max_login_failures,
        config.login_failure_window,
    );

    let auth_service = AuthService::new(pool.clone(), jwt.clone(), limiter.clone());
    let analytics_state = AnalyticsState::new(pool.clone(), jwt);

    // Session cleanup sweeps expired rows that were never explicitly
    // invalidated
    spawn_session_cleanup(pool.clone(), limiter.clone());

    let app = Router::new()
        .route("/health", get(health))
        .with_state(pool)
        .nest("/api/auth", auth_router(auth_service))
        .nest("/api/analytics", analytics_router(analytics_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    info!(addr = %config.bind_addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(pool): State<PgPool>) -> (StatusCode, Json<serde_json::Value>) {
    match health_check(&pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": e.to_string() })),
        ),
    }
}

fn spawn_session_cleanup(pool: PgPool, limiter: FailedLoginLimiter) {
    use fluentia::db::repositories::{PasswordResetRepository, SessionRepository};

    tokio::spawn(async move {
        let sessions = SessionRepository::new(pool.clone());
        let resets = PasswordResetRepository::new(pool);
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));

        loop {
            interval.tick().await;
            match sessions.cleanup_expired().await {
                Ok(n) if n > 0 => info!(removed = n, "Cleaned up expired sessions"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Session cleanup failed"),
            }
            if let Err(e) = resets.cleanup().await {
                tracing::warn!(error = %e, "Reset token cleanup failed");
            }
            limiter.purge_lapsed();
        }
    });
}
