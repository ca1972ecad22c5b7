//! Client-side session mirror.
//!
//! Everything the server's auth layer expects a well-behaved client to do:
//!
//! - [`storage`] - persisted token + user snapshot (two keys, cleared
//!   together on logout or corruption)
//! - [`session`] - reactive current-identity state with replay-latest
//!   subscription and idempotent logout
//! - [`guard`] - route gating on the decoded token role
//! - [`interceptor`] - bearer attachment and auto-logout on 401/403
//!
//! The session is an explicitly constructed, injectable state holder - there
//! is no ambient global.

/// Route guard decisions for protected client routes.
pub mod guard;
/// Outgoing request interceptor and typed API calls.
pub mod interceptor;
/// Reactive session state and rehydration.
pub mod session;
/// Persisted key-value session storage.
pub mod storage;

pub use guard::{can_activate, GuardDecision};
pub use interceptor::{ApiClient, ClientError, ClientResult};
pub use session::{Navigator, NoopNavigator, Session};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
