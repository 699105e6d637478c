//! gostrike runtime — the cdylib the native host loads.
//!
//! This crate is nothing but the exported C ABI boundary: every
//! `#[no_mangle] extern "C"` function the host calls
//! lives in [`ffi`], each wrapped in `gostrike_engine`'s panic guard so
//! a managed-side panic can never unwind across the FFI edge. All
//! actual dispatch logic lives in `gostrike-core`; this crate only
//! marshals arguments and forwards.

pub mod ffi;

pub use ffi::{
    ClearLastError, FreeLastError, GetABIVersion, GetLastError, Init, OnChatMessage,
    OnConsoleCommand, OnDamage, OnEntityCreated, OnEntityDeleted, OnEntitySpawned, OnEvent,
    OnMapChange, OnPlayerConnect, OnPlayerDisconnect, OnTick, RegisterCallbacks, Shutdown,
};
