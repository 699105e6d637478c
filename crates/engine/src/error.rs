//! Error types surfaced by the boundary's `Init`/`Shutdown` sentinel.

/// Error returned when a boundary export needs the callback table or the
/// `Init` sentinel in a state it isn't currently in.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A boundary function that requires `Init` was called before it, or
    /// after `Shutdown`.
    #[error("gostrike runtime not initialized")]
    NotInitialized,
}
