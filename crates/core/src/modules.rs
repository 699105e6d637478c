//! Process-wide subsystems with explicit init/shutdown pairs: a small,
//! enumerated set of them, each with its own explicit Init/Shutdown
//! pair and no implicit lazy initialization.
//!
//! Invoked by the boundary's `Init`/`Shutdown`, before any plugin loads
//! and after every plugin unloads, so plugin code can assume the
//! permission store is already up. The HTTP control plane lives in
//! `gostrike-http`, which depends on this crate rather than the other
//! way around, so its own start/stop is orchestrated alongside this
//! one from the boundary crate instead of from here.

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("permission module failed to start: {0}")]
    Permissions(#[from] crate::permissions::PermissionError),
}

/// Start every ambient subsystem in a fixed order. Idempotent: each
/// subsystem's own `init()` is a no-op on a second call.
pub fn init_all() -> Result<(), ModuleError> {
    crate::permissions::init()?;
    tracing::info!("permission module initialized");
    Ok(())
}

/// Stop every ambient subsystem in reverse order.
pub fn shutdown_all() {
    crate::permissions::shutdown();
    tracing::info!("permission module shut down");
}
