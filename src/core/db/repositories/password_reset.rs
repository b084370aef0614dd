//! Password reset token repository
//!
//! Single-use tokens for the forgot-password flow. Like refresh tokens they
//! are stored as SHA-256 hashes; unlike refresh tokens they are consumed on
//! first use and expire after one hour.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::PasswordResetToken;
use crate::core::db::pool::is_connectivity_error;
use crate::core::db::repositories::session::SessionRepository;

/// Validity window for reset tokens
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Password reset repository error types
#[derive(Debug, thiserror::Error)]
pub enum PasswordResetRepositoryError {
    #[error("Reset token expired or already used")]
    Invalid,

    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for PasswordResetRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            PasswordResetRepositoryError::DatabaseUnavailable(err.to_string())
        } else {
            PasswordResetRepositoryError::DatabaseError(err)
        }
    }
}

/// Password reset repository for database operations
#[derive(Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    /// Create a new password reset repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a new reset token for a user. Outstanding tokens for the same
    /// user are invalidated so only the latest emailed link works.
    pub async fn create(
        &self,
        user_id: Uuid,
        raw_token: &str,
    ) -> Result<PasswordResetToken, PasswordResetRepositoryError> {
        let token_hash = SessionRepository::hash_token(raw_token);
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET consumed_at = NOW()
            WHERE user_id = $1 AND consumed_at IS NULL
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, consumed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(token)
    }

    /// Consume a reset token: marks it used and returns it if it was live.
    /// The UPDATE is conditional so concurrent confirmations cannot both win.
    pub async fn consume(
        &self,
        raw_token: &str,
    ) -> Result<PasswordResetToken, PasswordResetRepositoryError> {
        let token_hash = SessionRepository::hash_token(raw_token);

        let token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            UPDATE password_reset_tokens
            SET consumed_at = NOW()
            WHERE token_hash = $1 AND consumed_at IS NULL AND expires_at > NOW()
            RETURNING id, user_id, token_hash, expires_at, consumed_at, created_at
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await?;

        token.ok_or(PasswordResetRepositoryError::Invalid)
    }

    /// Remove expired and consumed tokens (periodic housekeeping)
    pub async fn cleanup(&self) -> Result<u64, PasswordResetRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM password_reset_tokens
            WHERE expires_at < NOW() OR consumed_at IS NOT NULL
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
