//! JWT Authentication and Middleware
//!
//! Authentication infrastructure for the Keyplan API: token issuance and
//! verification, password hashing, and the Axum middleware that attaches a
//! verified [`Identity`](crate::types::Identity) to each protected request.
//!
//! # Module Structure
//!
//! - [`jwt`] - token encoding/decoding, claims, password hashing
//! - [`middleware`] - Axum middleware, `AuthUser` extractor, role gate
//!
//! # Security Notes
//!
//! - Passwords are hashed with Argon2id (PHC strings); hashes are computed
//!   once at account creation and are never re-derivable.
//! - Tokens are HS256 signed, carry only `{id, role}` plus timestamps, and
//!   expire. Verification is stateless; there is no server-side session.
//! - A missing `Authorization` header is 401; a present-but-invalid token is
//!   403. Clients rely on that distinction.

/// JWT token generation, validation, and password hashing services.
pub mod jwt;
/// Authentication middleware, extractor, and role gate for protected routes.
pub mod middleware;
