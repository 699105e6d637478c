//! The durable permission store.
//!
//! Roles and players live in SQLite; an in-memory cache serves every
//! read so the hot path (a chat command's permission check) never
//! touches the database. Every mutation re-reads the whole store into a
//! fresh cache under one write lock before returning, so readers always
//! see either the state before or after a write, never a partial one.
//!
//! ```ignore
//! gostrike_core::permissions::init()?;
//! let store = gostrike_core::permissions::store().unwrap();
//! if store.has_permission(steam_id, "gostrike.kick", now) {
//!     // ...
//! }
//! ```

mod registry;
mod store;
mod types;

pub use registry::{init, now_unix, shutdown, store, PermissionError, PermissionStore};
pub use store::StoreError;
pub use types::{permission_matches, PlayerRecord, RegisteredPermission, Role};

#[cfg(test)]
pub(crate) use registry::test_store;
