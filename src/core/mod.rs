//! Core modules for Fluentia

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod validation;
