//! Database models for Fluentia
//!
//! This module defines the database entity structs that map to PostgreSQL
//! tables: users, sessions, login attempts, audit log entries and password
//! reset tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Role
// ============================================================================

/// Role assigned to a user and embedded in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered learner or administrator
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub role: Role,
    pub email_verified: bool,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            role: user.role,
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Session Model
// ============================================================================

/// Session entity holding a hashed refresh token
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub remember_me: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// LoginAttempt Model
// ============================================================================

/// A single authentication attempt. Append-only; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginAttempt {
    pub id: Uuid,
    pub email: String,
    pub ip_address: Option<String>,
    pub succeeded: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Audit Log Model
// ============================================================================

/// Outcome of an audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "audit_outcome", rename_all = "lowercase")]
pub enum AuditOutcome {
    Success,
    Failure,
}

/// Immutable record of a sensitive action. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub event_type: String,
    pub outcome: AuditOutcome,
    pub actor_id: Option<Uuid>,
    /// 0-100, higher means more suspicious
    pub risk_score: i16,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Well-known audit event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    UserRegistered,
    LoginSucceeded,
    LoginFailed,
    LoginRateLimited,
    LoginLockedOut,
    TokenRefreshed,
    PasswordChanged,
    PasswordResetRequested,
    PasswordResetCompleted,
    PasswordResetRejected,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::UserRegistered => "user.registered",
            AuditEvent::LoginSucceeded => "login.succeeded",
            AuditEvent::LoginFailed => "login.failed",
            AuditEvent::LoginRateLimited => "login.rate_limited",
            AuditEvent::LoginLockedOut => "login.locked_out",
            AuditEvent::TokenRefreshed => "token.refreshed",
            AuditEvent::PasswordChanged => "password.changed",
            AuditEvent::PasswordResetRequested => "password_reset.requested",
            AuditEvent::PasswordResetCompleted => "password_reset.completed",
            AuditEvent::PasswordResetRejected => "password_reset.rejected",
        }
    }

    /// Baseline risk score for this event kind
    pub fn risk_score(&self) -> i16 {
        match self {
            AuditEvent::UserRegistered => 10,
            AuditEvent::LoginSucceeded => 0,
            AuditEvent::LoginFailed => 40,
            AuditEvent::LoginRateLimited => 80,
            AuditEvent::LoginLockedOut => 90,
            AuditEvent::TokenRefreshed => 0,
            AuditEvent::PasswordChanged => 20,
            AuditEvent::PasswordResetRequested => 30,
            AuditEvent::PasswordResetCompleted => 30,
            AuditEvent::PasswordResetRejected => 70,
        }
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Password Reset Model
// ============================================================================

/// Single-use password reset token, stored hashed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    }

    #[test]
    fn test_role_deserialization() {
        let user: Role = serde_json::from_str(r#""user""#).unwrap();
        let admin: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(user, Role::User);
        assert_eq!(admin, Role::Admin);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            first_name: "Test".to_string(),
            role: Role::User,
            email_verified: false,
            locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$secret"));
    }

    #[test]
    fn test_user_response_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "learner@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Lena".to_string(),
            role: Role::Admin,
            email_verified: true,
            locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let response: UserResponse = user.clone().into();
        assert_eq!(response.id, user.id);
        assert_eq!(response.email, "learner@example.com");
        assert_eq!(response.role, Role::Admin);
        assert!(response.email_verified);
    }

    #[test]
    fn test_audit_event_strings() {
        assert_eq!(AuditEvent::UserRegistered.as_str(), "user.registered");
        assert_eq!(AuditEvent::LoginRateLimited.as_str(), "login.rate_limited");
        assert_eq!(
            AuditEvent::PasswordResetRequested.as_str(),
            "password_reset.requested"
        );
    }

    #[test]
    fn test_audit_event_risk_scores_bounded() {
        let events = [
            AuditEvent::UserRegistered,
            AuditEvent::LoginSucceeded,
            AuditEvent::LoginFailed,
            AuditEvent::LoginRateLimited,
            AuditEvent::LoginLockedOut,
            AuditEvent::TokenRefreshed,
            AuditEvent::PasswordChanged,
            AuditEvent::PasswordResetRequested,
            AuditEvent::PasswordResetCompleted,
            AuditEvent::PasswordResetRejected,
        ];

        for event in events {
            let score = event.risk_score();
            assert!((0..=100).contains(&score), "{event}: {score}");
        }
    }

    #[test]
    fn test_audit_event_failure_scores_above_success() {
        assert!(AuditEvent::LoginFailed.risk_score() > AuditEvent::LoginSucceeded.risk_score());
        assert!(
            AuditEvent::LoginRateLimited.risk_score() > AuditEvent::LoginFailed.risk_score()
        );
    }

    #[test]
    fn test_session_token_hash_not_serialized() {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "deadbeef".to_string(),
            remember_me: true,
            expires_at: Utc::now(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(json.contains("remember_me"));
    }
}
