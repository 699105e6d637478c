//! Plugin lifecycle and per-plugin resource scoping.

mod manager;
mod scope;

use std::sync::LazyLock;

pub use manager::{register, LoadOrderClass, Plugin, PluginManager, PluginState};
pub use scope::{ScopeTracker, ScopedHandle, SCOPE};

/// The process-wide plugin manager.
pub static MANAGER: LazyLock<PluginManager> = LazyLock::new(PluginManager::new);

/// Run the full load sequence: collect every plugin registered via
/// [`register`] since the last call, dependency-sort, and load in
/// order. Called once from the boundary's `Init`.
pub fn init() {
    MANAGER.init();
}

/// Unload every loaded plugin in reverse load order. Called from the
/// boundary's `Shutdown`.
pub fn shutdown() {
    MANAGER.shutdown();
}

/// Hot-reload a single plugin by slug.
pub fn reload(slug: &str) -> Result<(), String> {
    MANAGER.reload(slug)
}
