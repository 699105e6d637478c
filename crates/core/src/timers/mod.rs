//! Cooperative timers driven by `OnTick`.
//!
//! There is no wall-clock timing anywhere in this module: every timer's
//! `remaining` budget only ever moves when [`tick`] is called with the
//! host-reported delta for that frame.
//!
//! # Example
//!
//! ```ignore
//! use gostrike_core::timers::{add_timer, add_repeating_timer, remove_timer};
//!
//! let one_shot = add_timer(5.0, || tracing::info!("5 seconds of ticks elapsed"));
//!
//! let repeating = add_repeating_timer(0.1, || tracing::debug!("tick"));
//! remove_timer(repeating);
//! ```

mod scheduler;

use std::sync::LazyLock;

pub use scheduler::Scheduler;

use crate::handler_id::HandlerId;

static SCHEDULER: LazyLock<Scheduler> = LazyLock::new(Scheduler::new);

/// Register a one-shot timer that fires once `interval` seconds of tick
/// deltas have accumulated, then removes itself.
pub fn add_timer(interval_secs: f64, callback: impl FnMut() + Send + 'static) -> HandlerId {
    let id = SCHEDULER.register(interval_secs, false, callback);
    crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Timer(id));
    id
}

/// Register a repeating timer that fires every `interval` seconds of
/// accumulated tick deltas until [`remove_timer`] is called (including
/// from inside its own callback).
pub fn add_repeating_timer(interval_secs: f64, callback: impl FnMut() + Send + 'static) -> HandlerId {
    let id = SCHEDULER.register(interval_secs, true, callback);
    crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Timer(id));
    id
}

/// Cancel a timer. Returns `false` for an id that never existed or has
/// already fired/been removed — unregistration is idempotent.
pub fn remove_timer(id: HandlerId) -> bool {
    SCHEDULER.stop(id)
}

/// Number of timers currently scheduled (fired one-shots and stopped
/// timers are already gone by the time this is read).
pub fn timer_count() -> usize {
    SCHEDULER.timer_count()
}

/// Advance the scheduler by `delta_secs` of elapsed tick time. Called by
/// the boundary's `OnTick` handler before the event bus's tick handlers
/// run.
pub fn tick(delta_secs: f64) {
    SCHEDULER.tick(delta_secs);
}
