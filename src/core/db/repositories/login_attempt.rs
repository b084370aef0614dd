//! Login attempt repository
//!
//! Append-only record of authentication attempts. Rows are written on every
//! login call and read back by the analytics endpoint; they are never mutated.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::db::models::LoginAttempt;
use crate::core::db::pool::is_connectivity_error;

/// Login attempt repository error types
#[derive(Debug, thiserror::Error)]
pub enum LoginAttemptRepositoryError {
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for LoginAttemptRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            LoginAttemptRepositoryError::DatabaseUnavailable(err.to_string())
        } else {
            LoginAttemptRepositoryError::DatabaseError(err)
        }
    }
}

/// Login attempt repository for database operations
#[derive(Clone)]
pub struct LoginAttemptRepository {
    pool: PgPool,
}

impl LoginAttemptRepository {
    /// Create a new login attempt repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an authentication attempt
    pub async fn record(
        &self,
        email: &str,
        ip_address: Option<&str>,
        succeeded: bool,
    ) -> Result<LoginAttempt, LoginAttemptRepositoryError> {
        let attempt = sqlx::query_as::<_, LoginAttempt>(
            r#"
            INSERT INTO login_attempts (email, ip_address, succeeded)
            VALUES ($1, $2, $3)
            RETURNING id, email, ip_address, succeeded, created_at
            "#,
        )
        .bind(email)
        .bind(ip_address)
        .bind(succeeded)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempt)
    }

    /// Count attempts for an identity since the given instant
    pub async fn count_since(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, LoginAttemptRepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM login_attempts
            WHERE email = $1 AND created_at >= $2
            "#,
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count all attempts since the given instant, optionally only failures
    pub async fn count_all_since(
        &self,
        since: DateTime<Utc>,
        failures_only: bool,
    ) -> Result<i64, LoginAttemptRepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM login_attempts
            WHERE created_at >= $1 AND (NOT $2 OR NOT succeeded)
            "#,
        )
        .bind(since)
        .bind(failures_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// List recent attempts for an identity, newest first
    pub async fn list_recent(
        &self,
        email: &str,
        limit: i64,
    ) -> Result<Vec<LoginAttempt>, LoginAttemptRepositoryError> {
        let attempts = sqlx::query_as::<_, LoginAttempt>(
            r#"
            SELECT id, email, ip_address, succeeded, created_at
            FROM login_attempts
            WHERE email = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(email)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}
