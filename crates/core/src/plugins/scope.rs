//! Per-plugin handle tracking.
//!
//! A process-wide "active scope" slot names whichever plugin is
//! currently inside its `Load` call. Every SDK registration function
//! records the handle it just issued against that slot, if one is set.
//! `Unload` drains the plugin's recorded handles and unregisters each by
//! kind, so a plugin can never leak a handler past its own lifetime.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::{Mutex, RwLock};

use crate::handler_id::HandlerId;

/// One handle kind per SDK registration surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopedHandle {
    Event(HandlerId),
    Timer(HandlerId),
    ChatCommand(String),
    ConsoleCommand(String),
    IpcSubscription(HandlerId),
    Service(String),
    Permission(String),
}

#[derive(Default)]
pub struct ScopeTracker {
    active: Mutex<Option<String>>,
    scopes: RwLock<HashMap<String, Vec<ScopedHandle>>>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `slug` as the active scope and ensure it has a (possibly
    /// empty) handle bag, for the duration of its `Load` call.
    pub fn enter(&self, slug: &str) {
        self.scopes.write().entry(slug.to_string()).or_default();
        *self.active.lock() = Some(slug.to_string());
    }

    /// Clear the active scope slot. Does not touch recorded handles.
    pub fn exit(&self) {
        *self.active.lock() = None;
    }

    /// Record a handle against the currently active scope, if one is
    /// set. A no-op outside of any plugin's `Load` call.
    pub fn record(&self, handle: ScopedHandle) {
        let active = self.active.lock().clone();
        if let Some(slug) = active {
            self.scopes.write().entry(slug).or_default().push(handle);
        }
    }

    /// Remove and return every handle recorded for `slug`. Idempotent:
    /// draining an unknown or already-drained slug returns an empty
    /// `Vec`.
    pub fn drain(&self, slug: &str) -> Vec<ScopedHandle> {
        self.scopes.write().remove(slug).unwrap_or_default()
    }

    pub fn recorded_count(&self, slug: &str) -> usize {
        self.scopes.read().get(slug).map(Vec::len).unwrap_or(0)
    }
}

/// The process-wide scope tracker the plugin manager installs into and
/// drains.
pub static SCOPE: LazyLock<ScopeTracker> = LazyLock::new(ScopeTracker::new);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_recorded_while_active_are_scoped_to_that_plugin() {
        let tracker = ScopeTracker::new();
        tracker.enter("kickvote");
        tracker.record(ScopedHandle::Timer(HandlerId::next()));
        tracker.record(ScopedHandle::ChatCommand("kick".into()));
        tracker.exit();

        assert_eq!(tracker.recorded_count("kickvote"), 2);
    }

    #[test]
    fn record_outside_any_scope_is_a_no_op() {
        let tracker = ScopeTracker::new();
        tracker.record(ScopedHandle::Timer(HandlerId::next()));
        assert_eq!(tracker.recorded_count("anything"), 0);
    }

    #[test]
    fn p7_drain_removes_everything_and_is_idempotent() {
        let tracker = ScopeTracker::new();
        tracker.enter("kickvote");
        tracker.record(ScopedHandle::Timer(HandlerId::next()));
        tracker.exit();

        let drained = tracker.drain("kickvote");
        assert_eq!(drained.len(), 1);
        assert_eq!(tracker.recorded_count("kickvote"), 0);
        assert!(tracker.drain("kickvote").is_empty());
    }

    #[test]
    fn two_plugins_scopes_never_mix() {
        let tracker = ScopeTracker::new();
        tracker.enter("a");
        tracker.record(ScopedHandle::Service("svc-a".into()));
        tracker.exit();
        tracker.enter("b");
        tracker.record(ScopedHandle::Service("svc-b".into()));
        tracker.exit();

        let a = tracker.drain("a");
        assert_eq!(a, vec![ScopedHandle::Service("svc-a".into())]);
        let b = tracker.drain("b");
        assert_eq!(b, vec![ScopedHandle::Service("svc-b".into())]);
    }
}
