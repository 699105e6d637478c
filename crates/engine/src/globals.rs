//! Global callback table storage.
//!
//! The host registers its [`CallbackTable`] via `RegisterCallbacks`.
//! Later registrations replace earlier ones: a second call swaps the
//! table rather than failing, so the table lives behind a
//! reader/writer lock instead of a `OnceLock`. Everything downstream
//! reaches the host exclusively through the table returned by
//! [`try_callbacks`]/[`callbacks`] — there is no other path back across
//! the boundary.

use std::thread::ThreadId;

use parking_lot::RwLock;

use gostrike_sdk::CallbackTable;

struct EngineState {
    table: CallbackTable,
    main_thread_id: ThreadId,
}

static ENGINE: RwLock<Option<EngineState>> = RwLock::new(None);

/// Record the host's callback table. Called from the `RegisterCallbacks`
/// boundary export, on the thread the host considers its game thread. A
/// later call replaces the table but keeps the `main_thread_id` from the
/// first registration, since that identifies the thread `Init` ran on.
pub fn register_callbacks(table: CallbackTable) {
    let mut engine = ENGINE.write();
    let main_thread_id = engine
        .as_ref()
        .map(|s| s.main_thread_id)
        .unwrap_or_else(|| std::thread::current().id());
    *engine = Some(EngineState { table, main_thread_id });
}

/// Drop the registered callback table. Called from `Shutdown` so a
/// subsequent `Init`/`RegisterCallbacks` pair starts from a clean slate.
pub fn clear() {
    *ENGINE.write() = None;
}

/// Borrow the registered callback table.
///
/// # Panics
/// Panics if called before [`register_callbacks`]. Every call site sits
/// behind the `Init`-checked boundary, so this should never fire in
/// practice; see [`try_callbacks`] for a non-panicking variant.
pub fn callbacks() -> CallbackTable {
    ENGINE
        .read()
        .as_ref()
        .expect("callback table not registered")
        .table
}

/// Borrow the registered callback table without panicking.
///
/// Returns an owned copy since [`CallbackTable`] is a flat bag of
/// `Option<fn ptr>`s (`Copy`) — cheaper than threading a lock guard's
/// lifetime through every call site.
pub fn try_callbacks() -> Option<CallbackTable> {
    ENGINE.read().as_ref().map(|s| s.table)
}

/// Whether [`register_callbacks`] has been called and [`clear`] has not.
pub fn is_initialized() -> bool {
    ENGINE.read().is_some()
}

/// Whether the calling thread is the one that first called
/// `RegisterCallbacks`.
///
/// Subsystems that are only safe to drive from the game thread (timers,
/// the event bus, entity/schema access) use this to route cross-thread
/// requests through the task queue instead of calling straight through.
pub fn is_main_thread() -> bool {
    ENGINE
        .read()
        .as_ref()
        .map(|s| std::thread::current().id() == s.main_thread_id)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_registration_replaces_earlier() {
        let a = CallbackTable::default();
        let mut b = CallbackTable::default();
        b.core.max_slots = None;
        register_callbacks(a);
        assert!(is_initialized());
        register_callbacks(b);
        assert!(is_initialized());
        clear();
        assert!(!is_initialized());
        assert!(try_callbacks().is_none());
    }
}
