//! The panic guard every boundary export is wrapped in.
//!
//! A panic inside the managed core must never unwind across the FFI edge
//! into the host's C++ call stack — that's undefined behavior. Every
//! `#[no_mangle] extern "C"` export in `gostrike-runtime` runs its body
//! through [`guard`], which catches the unwind, records a human-readable
//! message for `GetLastError`, and converts it into a
//! [`BoundaryStatus::Panic`].

use std::panic::{self, AssertUnwindSafe};

use parking_lot::RwLock;

use gostrike_sdk::BoundaryStatus;

static LAST_ERROR: RwLock<Option<String>> = RwLock::new(None);

/// Run `f`, catching any panic and recording its message.
///
/// Returns `BoundaryStatus::Ok` if `f` returned `Ok(())`, `NotInitialized`
/// if `f` returned `Err` (the caller maps its own error into that before
/// returning it — see callers in `gostrike-runtime`), or `Panic` if `f`
/// unwound.
pub fn guard<F>(f: F) -> BoundaryStatus
where
    F: FnOnce() -> Result<(), String>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    match result {
        Ok(Ok(())) => BoundaryStatus::Ok,
        Ok(Err(message)) => {
            set_last_error(message);
            BoundaryStatus::NotInitialized
        }
        Err(payload) => {
            set_last_error(panic_message(payload));
            BoundaryStatus::Panic
        }
    }
}

/// Like [`guard`] but for exports that produce a value on success; the
/// value is returned via `out` only when the status is `Ok`.
pub fn guard_value<T, F>(out: &mut T, default: T, f: F) -> BoundaryStatus
where
    F: FnOnce() -> Result<T, String>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    match result {
        Ok(Ok(value)) => {
            *out = value;
            BoundaryStatus::Ok
        }
        Ok(Err(message)) => {
            *out = default;
            set_last_error(message);
            BoundaryStatus::NotInitialized
        }
        Err(payload) => {
            *out = default;
            set_last_error(panic_message(payload));
            BoundaryStatus::Panic
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn set_last_error(message: String) {
    tracing::error!(%message, "boundary call failed");
    *LAST_ERROR.write() = Some(message);
}

/// Retrieve the most recently recorded failure message, if any.
pub fn last_error() -> Option<String> {
    LAST_ERROR.read().clone()
}

/// Clear the recorded failure message.
pub fn clear_last_error() {
    *LAST_ERROR.write() = None;
}
