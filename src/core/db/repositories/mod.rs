//! Database repositories for Fluentia
//!
//! This module provides repository implementations for database operations.
//! Repositories encapsulate data access logic and provide a clean API for
//! business logic to interact with the database.

pub mod audit;
pub mod login_attempt;
pub mod password_reset;
pub mod session;
pub mod user;

pub use audit::{AuditRepository, AuditRepositoryError};
pub use login_attempt::{LoginAttemptRepository, LoginAttemptRepositoryError};
pub use password_reset::{PasswordResetRepository, PasswordResetRepositoryError};
pub use session::{SessionRepository, SessionRepositoryError};
pub use user::{UserRepository, UserRepositoryError};
