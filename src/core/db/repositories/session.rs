//! Session repository for refresh token management
//!
//! Handles storage and validation of refresh tokens for JWT authentication.
//! Tokens are stored as SHA-256 hashes. Remember-me sessions get a longer
//! lifetime and the flag survives token rotation.

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::Session;
use crate::core::db::pool::is_connectivity_error;

/// Default session duration (7 days)
pub const DEFAULT_SESSION_DURATION_DAYS: i64 = 7;

/// Session duration when remember-me is set (30 days)
pub const REMEMBER_ME_SESSION_DURATION_DAYS: i64 = 30;

/// Session repository error types
#[derive(Debug, thiserror::Error)]
pub enum SessionRepositoryError {
    #[error("Session expired")]
    Expired,

    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for SessionRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            SessionRepositoryError::DatabaseUnavailable(err.to_string())
        } else {
            SessionRepositoryError::DatabaseError(err)
        }
    }
}

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a token using SHA-256
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Duration in days for a session with the given remember-me flag
    pub fn duration_days(remember_me: bool) -> i64 {
        if remember_me {
            REMEMBER_ME_SESSION_DURATION_DAYS
        } else {
            DEFAULT_SESSION_DURATION_DAYS
        }
    }

    /// Create a new session with a hashed token.
    /// The raw token is what goes to the client; only its hash is stored.
    pub async fn create(
        &self,
        user_id: Uuid,
        raw_token: &str,
        remember_me: bool,
    ) -> Result<Session, SessionRepositoryError> {
        let token_hash = Self::hash_token(raw_token);
        let expires_at = Utc::now() + Duration::days(Self::duration_days(remember_me));

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, remember_me, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_hash, remember_me, expires_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(remember_me)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Find a session by raw token (will be hashed for lookup)
    pub async fn find_by_token(
        &self,
        raw_token: &str,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        let token_hash = Self::hash_token(raw_token);

        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_hash, remember_me, expires_at, created_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Validate a session token and return the session if valid.
    /// Returns None if the token is unknown, Err(Expired) if past expiry
    /// (the expired row is removed on the way out).
    pub async fn validate_token(
        &self,
        raw_token: &str,
    ) -> Result<Option<Session>, SessionRepositoryError> {
        let session = match self.find_by_token(raw_token).await? {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.expires_at < Utc::now() {
            self.delete(session.id).await?;
            return Err(SessionRepositoryError::Expired);
        }

        Ok(Some(session))
    }

    /// Delete a session by ID (logout from specific device)
    pub async fn delete(&self, id: Uuid) -> Result<bool, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a session by raw token
    pub async fn delete_by_token(&self, raw_token: &str) -> Result<bool, SessionRepositoryError> {
        let token_hash = Self::hash_token(raw_token);

        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(&token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user (logout from all devices)
    pub async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clean up expired sessions (should be run periodically)
    pub async fn cleanup_expired(&self) -> Result<u64, SessionRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at < NOW()
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count active (non-expired) sessions across all users
    pub async fn count_active(&self) -> Result<i64, SessionRepositoryError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE expires_at > NOW()")
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    /// Count active sessions for a user
    pub async fn count_user_sessions(&self, user_id: Uuid) -> Result<i64, SessionRepositoryError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM sessions
            WHERE user_id = $1 AND expires_at > NOW()
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
