//! Application configuration
//!
//! All knobs come from environment variables, loaded through dotenvy in
//! `main`. Database and JWT settings keep their own config types; this
//! module covers the server itself and the login failure limiter.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::core::auth::rate_limit::{DEFAULT_MAX_FAILURES, DEFAULT_WINDOW};

const DEFAULT_PORT: u16 = 3000;

/// Server and limiter configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Failed logins allowed before an identity is limited
    pub max_login_failures: u32,
    /// Width of the failure counting window
    pub login_failure_window: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_login_failures: DEFAULT_MAX_FAILURES,
            login_failure_window: DEFAULT_WINDOW,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host: IpAddr = std::env::var("HOST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.bind_addr.ip());

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let max_login_failures = std::env::var("MAX_LOGIN_FAILURES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_login_failures);

        let login_failure_window = std::env::var("LOGIN_FAILURE_WINDOW_MINUTES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(|m| Duration::from_secs(m * 60))
            .unwrap_or(defaults.login_failure_window);

        Self {
            bind_addr: SocketAddr::new(host, port),
            max_login_failures,
            login_failure_window,
        }
    }
}
