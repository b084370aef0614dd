//! Audit log repository
//!
//! Append-only record of sensitive actions for compliance review. Entries are
//! never updated or deleted through this API.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{AuditEvent, AuditLogEntry, AuditOutcome};
use crate::core::db::pool::is_connectivity_error;

/// Audit repository error types
#[derive(Debug, thiserror::Error)]
pub enum AuditRepositoryError {
    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for AuditRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if is_connectivity_error(&err) {
            AuditRepositoryError::DatabaseUnavailable(err.to_string())
        } else {
            AuditRepositoryError::DatabaseError(err)
        }
    }
}

/// Audit log repository for database operations
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Create a new audit repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an audit entry for a well-known event
    pub async fn append(
        &self,
        event: AuditEvent,
        outcome: AuditOutcome,
        actor_id: Option<Uuid>,
        detail: Option<&str>,
    ) -> Result<AuditLogEntry, AuditRepositoryError> {
        self.append_raw(event.as_str(), outcome, actor_id, event.risk_score(), detail)
            .await
    }

    /// Append an audit entry with an explicit event type and risk score
    pub async fn append_raw(
        &self,
        event_type: &str,
        outcome: AuditOutcome,
        actor_id: Option<Uuid>,
        risk_score: i16,
        detail: Option<&str>,
    ) -> Result<AuditLogEntry, AuditRepositoryError> {
        let entry = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO audit_log (event_type, outcome, actor_id, risk_score, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_type, outcome, actor_id, risk_score, detail, created_at
            "#,
        )
        .bind(event_type)
        .bind(outcome)
        .bind(actor_id)
        .bind(risk_score)
        .bind(detail)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// List recent entries, newest first
    pub async fn list_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, AuditRepositoryError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, event_type, outcome, actor_id, risk_score, detail, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// List entries for one actor, newest first
    pub async fn list_for_actor(
        &self,
        actor_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, AuditRepositoryError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT id, event_type, outcome, actor_id, risk_score, detail, created_at
            FROM audit_log
            WHERE actor_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
