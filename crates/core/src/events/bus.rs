//! Fan-out dispatch for every event kind the boundary forwards in.
//!
//! Each event kind is a flat `Vec<(HandlerId, Handler)>` rather than a map
//! keyed by handler identity (insertion order is dispatch order; removal
//! is a swap-delete). Native events additionally key by `(name, phase)`
//! so `pre` and `post` registrations never share a list.
//!
//! Every dispatch takes a read lock, clones the relevant slice (handlers are
//! stored behind `Arc` so this is cheap), and releases the lock before
//! invoking anything, so a handler can register/unregister mid-dispatch
//! without deadlocking.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use gostrike_sdk::{DamageEventRaw, EventResult, NativeEventHandle, PlayerInfoRaw};

use crate::handler_id::HandlerId;
use crate::panic::catch;

use super::types::{DamageView, NativeEventView, PlayerInfo};

/// Dispatch phase for native game events: `pre` allows modification and
/// veto, `post` is observational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pre,
    Post,
}

pub type TickHandler = Arc<dyn Fn(f64) + Send + Sync>;
pub type NativeHandler = Arc<dyn Fn(&NativeEventView) -> EventResult + Send + Sync>;
pub type DamageHandler = Arc<dyn Fn(&DamageView) -> EventResult + Send + Sync>;
pub type PlayerConnectHandler = Arc<dyn Fn(&PlayerInfo) + Send + Sync>;
pub type PlayerDisconnectHandler = Arc<dyn Fn(i32, &str) + Send + Sync>;
pub type MapChangeHandler = Arc<dyn Fn(&str) + Send + Sync>;
pub type EntityLifecycleHandler = Arc<dyn Fn(i32, &str) + Send + Sync>;
pub type EntityDeletedHandler = Arc<dyn Fn(i32) + Send + Sync>;

/// Which bucket a [`HandlerId`] lives in, so unregistration doesn't need to
/// scan every list: an id is live in at most one list at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Bucket {
    Tick,
    Native(String, Phase),
    Damage,
    PlayerConnect,
    PlayerDisconnect,
    MapChange,
    EntityCreated,
    EntitySpawned,
    EntityDeleted,
}

#[derive(Default)]
struct Lists {
    tick: Vec<(HandlerId, TickHandler)>,
    native: HashMap<(String, Phase), Vec<(HandlerId, NativeHandler)>>,
    damage: Vec<(HandlerId, DamageHandler)>,
    player_connect: Vec<(HandlerId, PlayerConnectHandler)>,
    player_disconnect: Vec<(HandlerId, PlayerDisconnectHandler)>,
    map_change: Vec<(HandlerId, MapChangeHandler)>,
    entity_created: Vec<(HandlerId, EntityLifecycleHandler)>,
    entity_spawned: Vec<(HandlerId, EntityLifecycleHandler)>,
    entity_deleted: Vec<(HandlerId, EntityDeletedHandler)>,
}

/// The process-wide fan-out registry. One instance lives behind a
/// `LazyLock` in [`super`]; plugins never construct their own.
#[derive(Default)]
pub struct EventBus {
    lists: RwLock<Lists>,
    index: RwLock<HashMap<HandlerId, Bucket>>,
}

fn swap_remove_id<T>(list: &mut Vec<(HandlerId, T)>, id: HandlerId) -> bool {
    if let Some(pos) = list.iter().position(|(existing, _)| *existing == id) {
        list.swap_remove(pos);
        true
    } else {
        false
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: HandlerId, bucket: Bucket) {
        self.index.write().insert(id, bucket);
    }

    // -- registration -----------------------------------------------------

    pub fn on_tick(&self, handler: impl Fn(f64) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().tick.push((id, Arc::new(handler)));
        self.record(id, Bucket::Tick);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_native(
        &self,
        name: impl Into<String>,
        phase: Phase,
        handler: impl Fn(&NativeEventView) -> EventResult + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        let name = name.into();
        self.lists
            .write()
            .native
            .entry((name.clone(), phase))
            .or_default()
            .push((id, Arc::new(handler)));
        self.record(id, Bucket::Native(name, phase));
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_damage(
        &self,
        handler: impl Fn(&DamageView) -> EventResult + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().damage.push((id, Arc::new(handler)));
        self.record(id, Bucket::Damage);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_player_connect(&self, handler: impl Fn(&PlayerInfo) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().player_connect.push((id, Arc::new(handler)));
        self.record(id, Bucket::PlayerConnect);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_player_disconnect(
        &self,
        handler: impl Fn(i32, &str) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().player_disconnect.push((id, Arc::new(handler)));
        self.record(id, Bucket::PlayerDisconnect);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_map_change(&self, handler: impl Fn(&str) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().map_change.push((id, Arc::new(handler)));
        self.record(id, Bucket::MapChange);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_entity_created(&self, handler: impl Fn(i32, &str) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().entity_created.push((id, Arc::new(handler)));
        self.record(id, Bucket::EntityCreated);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_entity_spawned(&self, handler: impl Fn(i32, &str) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().entity_spawned.push((id, Arc::new(handler)));
        self.record(id, Bucket::EntitySpawned);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    pub fn on_entity_deleted(&self, handler: impl Fn(i32) + Send + Sync + 'static) -> HandlerId {
        let id = HandlerId::next();
        self.lists.write().entity_deleted.push((id, Arc::new(handler)));
        self.record(id, Bucket::EntityDeleted);
        crate::plugins::SCOPE.record(crate::plugins::ScopedHandle::Event(id));
        id
    }

    // -- unregistration -----------------------------------------------------

    /// Remove `id` from whichever list holds it. Idempotent: unknown ids
    /// (already-drained scopes, double unregistration) are silently
    /// ignored.
    pub fn unregister(&self, id: HandlerId) -> bool {
        let Some(bucket) = self.index.write().remove(&id) else {
            return false;
        };
        let mut lists = self.lists.write();
        match bucket {
            Bucket::Tick => swap_remove_id(&mut lists.tick, id),
            Bucket::Native(name, phase) => lists
                .native
                .get_mut(&(name, phase))
                .map(|v| swap_remove_id(v, id))
                .unwrap_or(false),
            Bucket::Damage => swap_remove_id(&mut lists.damage, id),
            Bucket::PlayerConnect => swap_remove_id(&mut lists.player_connect, id),
            Bucket::PlayerDisconnect => swap_remove_id(&mut lists.player_disconnect, id),
            Bucket::MapChange => swap_remove_id(&mut lists.map_change, id),
            Bucket::EntityCreated => swap_remove_id(&mut lists.entity_created, id),
            Bucket::EntitySpawned => swap_remove_id(&mut lists.entity_spawned, id),
            Bucket::EntityDeleted => swap_remove_id(&mut lists.entity_deleted, id),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.index.read().len()
    }

    // -- dispatch -----------------------------------------------------------

    /// Invoke every tick handler in registration order. Called after
    /// timers fire on the same tick.
    pub fn dispatch_tick(&self, delta: f64) {
        let snapshot: Vec<_> = self.lists.read().tick.clone();
        for (_, handler) in snapshot {
            catch(|| handler(delta));
        }
    }

    /// Veto-aware dispatch for a single `(name, phase)` pair: adopt the
    /// max of handler results in order, stop invoking once the running
    /// result reaches `Stop`.
    pub fn dispatch_native(
        &self,
        name: &str,
        phase: Phase,
        handle: NativeEventHandle,
    ) -> EventResult {
        let snapshot: Vec<_> = self
            .lists
            .read()
            .native
            .get(&(name.to_string(), phase))
            .cloned()
            .unwrap_or_default();

        let view = NativeEventView::new(handle, name, matches!(phase, Phase::Pre));
        let mut result = EventResult::Continue;
        for (_, handler) in snapshot {
            if let Some(handler_result) = catch(|| handler(&view)) {
                if handler_result > result {
                    result = handler_result;
                }
            }
            if result >= EventResult::Stop {
                break;
            }
        }
        result
    }

    /// Veto-aware dispatch for a damage event: exposes read-only
    /// victim/attacker/damage/type fields.
    pub fn dispatch_damage(&self, raw: DamageEventRaw) -> EventResult {
        let snapshot: Vec<_> = self.lists.read().damage.clone();
        let view = DamageView::from(raw);
        let mut result = EventResult::Continue;
        for (_, handler) in snapshot {
            if let Some(handler_result) = catch(|| handler(&view)) {
                if handler_result > result {
                    result = handler_result;
                }
            }
            if result >= EventResult::Stop {
                break;
            }
        }
        result
    }

    pub fn dispatch_player_connect(&self, raw: PlayerInfoRaw, name: String, ip: String) {
        let info = PlayerInfo::from_raw(raw, name, ip);
        let snapshot: Vec<_> = self.lists.read().player_connect.clone();
        for (_, handler) in snapshot {
            catch(|| handler(&info));
        }
    }

    pub fn dispatch_player_disconnect(&self, slot: i32, reason: &str) {
        let snapshot: Vec<_> = self.lists.read().player_disconnect.clone();
        for (_, handler) in snapshot {
            catch(|| handler(slot, reason));
        }
    }

    pub fn dispatch_map_change(&self, map_name: &str) {
        let snapshot: Vec<_> = self.lists.read().map_change.clone();
        for (_, handler) in snapshot {
            catch(|| handler(map_name));
        }
    }

    pub fn dispatch_entity_created(&self, index: i32, class_name: &str) {
        let snapshot: Vec<_> = self.lists.read().entity_created.clone();
        for (_, handler) in snapshot {
            catch(|| handler(index, class_name));
        }
    }

    pub fn dispatch_entity_spawned(&self, index: i32, class_name: &str) {
        let snapshot: Vec<_> = self.lists.read().entity_spawned.clone();
        for (_, handler) in snapshot {
            catch(|| handler(index, class_name));
        }
    }

    pub fn dispatch_entity_deleted(&self, index: i32) {
        let snapshot: Vec<_> = self.lists.read().entity_deleted.clone();
        for (_, handler) in snapshot {
            catch(|| handler(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn p2_veto_ladder_stops_at_first_stop() {
        let bus = EventBus::new();
        let order = Arc::new(RwLock::new(Vec::new()));

        let o1 = order.clone();
        bus.on_native("weapon_fire", Phase::Pre, move |_| {
            o1.write().push(1);
            EventResult::Continue
        });
        let o2 = order.clone();
        bus.on_native("weapon_fire", Phase::Pre, move |_| {
            o2.write().push(2);
            EventResult::Stop
        });
        let o3 = order.clone();
        bus.on_native("weapon_fire", Phase::Pre, move |_| {
            o3.write().push(3);
            EventResult::Handled
        });

        let result = bus.dispatch_native("weapon_fire", Phase::Pre, std::ptr::null_mut());
        assert_eq!(result, EventResult::Stop);
        assert_eq!(*order.read(), vec![1, 2]);
    }

    #[test]
    fn s6_two_damage_handlers_second_vetoes_third_skipped() {
        let bus = EventBus::new();
        let h3_called = Arc::new(AtomicI32::new(0));
        bus.on_damage(|_| EventResult::Continue);
        bus.on_damage(|_| EventResult::Stop);
        let h3 = h3_called.clone();
        bus.on_damage(move |_| {
            h3.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        });

        let raw = DamageEventRaw {
            victim_slot: 1,
            attacker_slot: 2,
            damage: 50.0,
            damage_type: 0,
            health_remaining: 50,
        };
        let result = bus.dispatch_damage(raw);
        assert_eq!(result, EventResult::Stop);
        assert_eq!(h3_called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pre_and_post_are_independent_lists() {
        let bus = EventBus::new();
        let pre_calls = Arc::new(AtomicI32::new(0));
        let post_calls = Arc::new(AtomicI32::new(0));
        let pre = pre_calls.clone();
        bus.on_native("round_start", Phase::Pre, move |_| {
            pre.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        });
        let post = post_calls.clone();
        bus.on_native("round_start", Phase::Post, move |_| {
            post.fetch_add(1, Ordering::SeqCst);
            EventResult::Continue
        });

        bus.dispatch_native("round_start", Phase::Pre, std::ptr::null_mut());
        assert_eq!(pre_calls.load(Ordering::SeqCst), 1);
        assert_eq!(post_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn p3_panicking_handler_does_not_block_siblings_or_non_veto_dispatch() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicI32::new(0));
        bus.on_tick(|_| panic!("boom"));
        let c = calls.clone();
        bus.on_tick(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        bus.dispatch_tick(0.1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn p1_unregister_removes_from_exactly_its_list() {
        let bus = EventBus::new();
        let id_a = bus.on_tick(|_| {});
        let id_b = bus.on_native("round_start", Phase::Pre, |_| EventResult::Continue);
        assert_eq!(bus.handler_count(), 2);
        assert!(bus.unregister(id_a));
        assert_eq!(bus.handler_count(), 1);
        // unknown / already-removed ids are a no-op
        assert!(!bus.unregister(id_a));
        assert!(bus.unregister(id_b));
        assert_eq!(bus.handler_count(), 0);
    }
}
