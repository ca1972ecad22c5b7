//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Authentication handlers (login).
pub mod auth;
/// Option-list handlers (security levels, organigramme types).
pub mod options;
/// Project CRUD handlers (owner-scoped).
pub mod projects;
/// User management handlers (admin only).
pub mod users;
