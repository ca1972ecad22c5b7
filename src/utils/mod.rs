//! Configuration utilities.

/// Environment-backed configuration.
pub mod config;
