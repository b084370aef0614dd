//! Operational analytics for Fluentia

pub mod api;

pub use api::{AnalyticsState, MetricsSnapshot, analytics_router};
