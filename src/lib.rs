//! # Keyplan - master-key project management API
//!
//! A project-management server for a lock/key security business: users
//! authenticate, clients create door/key projects with a chosen security
//! level, and administrators manage user accounts.
//!
//! The interesting part is the authenticated session and access-control
//! layer: stateless JWT issuance and verification, middleware that attaches
//! a verified identity to each request, handler-level role and
//! self-protection policy, and a client-side mirror of that state (persisted
//! token + snapshot, replay-latest identity stream, route guards, request
//! interception with auto-logout).
//!
//! ## Usage
//!
//! Run the `keyplan-server` binary, or embed the pieces:
//!
//! ```rust,ignore
//! use keyplan::{auth::jwt::AuthService, db::Store, AppState};
//! use keyplan::api::routes::create_router;
//! use std::sync::Arc;
//!
//! # async fn build() -> keyplan::Result<()> {
//! let store = Arc::new(Store::new_local("keyplan.db").await?);
//! let auth_service = Arc::new(AuthService::new(Some("secret".into()), 86_400));
//! let app = create_router(auth_service.clone())
//!     .with_state(AppState { store, auth_service });
//! # Ok(())
//! # }
//! ```
//!
//! The client mirror works against any running server:
//!
//! ```rust,ignore
//! use keyplan::client::{ApiClient, FileStorage, NoopNavigator, Session};
//! use std::sync::Arc;
//!
//! let session = Arc::new(Session::restore(
//!     Arc::new(FileStorage::open("session.json")),
//!     Arc::new(NoopNavigator),
//! ));
//! let api = ApiClient::new("http://localhost:3001/api", session);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST handlers and routes
//! - [`auth`] - JWT service, middleware, role gate
//! - [`client`] - client-side session mirror
//! - [`db`] - libsql row store
//! - [`types`] - roles, wire types, error taxonomy
//! - [`utils`] - configuration

#![warn(missing_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// JWT authentication and middleware.
pub mod auth;
/// Client-side session state, guards, and request interception.
pub mod client;
/// Database store (users, projects, cylinder catalog).
pub mod db;
/// Core types (identities, requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::jwt::AuthService;
pub use client::{ApiClient, Session};
pub use db::Store;
pub use types::{AppError, Identity, Result, Role};

use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Row store for users, projects, and the cylinder catalog.
    pub store: Arc<Store>,
    /// Token issuance/verification and password hashing.
    pub auth_service: Arc<AuthService>,
}
