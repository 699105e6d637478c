//! gostrike engine - callback table storage and the panic-safe boundary guard
//!
//! This crate is the thin layer between the raw C ABI exports in
//! `gostrike-runtime` and the dispatch logic in `gostrike-core`. It owns
//! exactly two pieces of global state: the host's registered
//! [`CallbackTable`][gostrike_sdk::CallbackTable] ([`globals`]) and the
//! last-error string a panicking boundary call leaves behind
//! ([`panic_guard`]).

pub mod error;
pub mod globals;
pub mod panic_guard;

pub use error::EngineError;
pub use globals::{callbacks, clear, is_initialized, is_main_thread, register_callbacks, try_callbacks};
pub use panic_guard::{clear_last_error, guard, guard_value, last_error};
