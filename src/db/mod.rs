//! Database layer.
//!
//! A single libsql-backed [`Store`] holds user accounts, projects and the
//! cylinder catalog. Handlers treat it as an opaque row store: lookups,
//! single-row inserts/updates/deletes, and two catalog queries. Tests use
//! [`Store::new_memory`].

pub mod store;

pub use store::{NewProject, NewUser, Store, UserUpdate};
