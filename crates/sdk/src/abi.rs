//! Boundary status codes and the ABI version constant.
//!
//! Every exported boundary function (see the `gostrike-runtime` crate)
//! returns a [`BoundaryStatus`] instead of unwinding across the FFI edge.
//! The host checks the status and, on [`BoundaryStatus::Panic`], may call
//! back in to read the last-error string captured by the panic guard.

/// Bumped whenever the shape of [`crate::CallbackTable`] or any exported
/// boundary function signature changes in a way the host must know about.
pub const ABI_VERSION: u32 = 2;

/// Outcome of a single boundary call.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryStatus {
    /// The call completed normally.
    Ok = 0,
    /// The call unwound from a Rust panic; it was caught at the boundary
    /// and the failure is recorded for retrieval via `GetLastError`.
    Panic = 1,
    /// `Init` has not yet been called, or `Shutdown` already has.
    NotInitialized = 2,
}

impl BoundaryStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}
