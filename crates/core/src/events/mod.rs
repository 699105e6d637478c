//! The typed fan-out event bus.
//!
//! One process-wide [`EventBus`] multiplexes every inbound boundary
//! callback — tick, native game event, player/entity lifecycle, map
//! change, damage — to however many handlers plugins have registered for
//! it, in registration order, with pre/post phasing and veto semantics
//! for the events that support them.

mod bus;
mod types;

use std::sync::LazyLock;

pub use bus::{EventBus, Phase};
pub use types::{DamageView, NativeEventView, PlayerInfo};

/// The process-wide event bus. The boundary crate dispatches every
/// inbound callback through this instance; plugins only ever see it
/// through the registration functions re-exported from [`crate`].
pub static EVENTS: LazyLock<EventBus> = LazyLock::new(EventBus::new);
