//! Fluentia backend library
//!
//! Authentication, session management, role-gated authorization and
//! operational analytics for the Fluentia language-learning platform.

pub mod core;
pub mod forms;

pub use crate::core::analytics;
pub use crate::core::auth;
pub use crate::core::config;
pub use crate::core::db;
pub use crate::core::validation;
