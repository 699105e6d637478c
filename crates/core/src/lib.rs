//! GoStrike core — the managed dispatch core.
//!
//! This crate owns everything the boundary's exported functions forward
//! into: the typed event bus, the cooperative scheduler, the chat and
//! console command routers, the permission store, and the plugin
//! lifecycle manager. It never touches the game directly — every
//! reverse call into the host goes through `gostrike_engine`'s cached
//! callback table.

extern crate self as gostrike_core;

pub use gostrike_engine as engine;
pub use gostrike_sdk as sdk;

pub mod ffi_str;

pub mod commands;
pub mod config;
pub mod events;
pub mod handler_id;
pub mod logging;
pub mod modules;
pub mod panic;
pub mod permissions;
pub mod plugins;
pub mod steamid;
pub mod tasks;
pub mod timers;

pub use gostrike_macros::{chat_command, console_command, plugin};

pub use handler_id::HandlerId;
pub use panic::catch;

/// Advance the scheduler, then dispatch tick handlers, then drain any
/// queued cross-thread tasks — the fixed ordering a single `OnTick`
/// follows.
pub fn on_tick(delta_seconds: f64) {
    timers::tick(delta_seconds);
    events::EVENTS.dispatch_tick(delta_seconds);
    tasks::process_queued_tasks();
}

/// Run once after a successful `Init`: starts the ambient subsystems,
/// then loads every self-registered plugin in dependency order.
pub fn init() -> Result<(), modules::ModuleError> {
    modules::init_all()?;
    plugins::init();
    Ok(())
}

/// Reverses [`init`]: unloads plugins in reverse load order, then stops
/// the ambient subsystems.
pub fn shutdown() {
    plugins::shutdown();
    modules::shutdown_all();
    tracing::info!("gostrike core shut down");
}
