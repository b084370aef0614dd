//! Authentication and authorization for Fluentia
//!
//! Covers credential handling, session lifecycle, JWT issuance, the
//! per-route role gate and login-failure rate limiting.

pub mod api;
pub mod gate;
pub mod jwt;
pub mod rate_limit;
pub mod service;

pub use api::auth_router;
pub use gate::{GateError, authorize, extract_bearer_token, role_satisfies};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenPair, TokenType};
pub use rate_limit::{CounterStore, FailedLoginLimiter, MemoryCounterStore};
pub use service::{AuthError, AuthService, AuthenticatedUser};
