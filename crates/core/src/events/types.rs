//! Payload views handed to event handlers.
//!
//! Native-event and damage-event contents never cross into this process
//! as real memory — every field read or write is a round trip through the
//! host's callback table, keyed by the opaque handle the host owns.

use gostrike_sdk::{DamageEventRaw, NativeEventHandle, PlayerInfoRaw, SchemaValueRaw, SchemaValueTag};

use gostrike_engine::try_callbacks;

/// A connected player's state at the moment of the snapshot. Not
/// authoritative beyond the current tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub slot: i32,
    pub user_id: i32,
    pub steam_id: u64,
    pub name: String,
    pub ip: String,
    pub team: i32,
    pub health: i32,
    pub armor: i32,
    pub is_bot: bool,
    pub is_connected: bool,
    pub is_alive: bool,
    pub position: [f32; 3],
}

impl PlayerInfo {
    /// Build an owned [`PlayerInfo`] from the raw boundary struct. The
    /// caller must have already copied `name`/`ip` out of the raw pointers
    /// (valid only for the duration of the call that produced them).
    pub fn from_raw(raw: PlayerInfoRaw, name: String, ip: String) -> Self {
        Self {
            slot: raw.slot,
            user_id: raw.user_id,
            steam_id: raw.steam_id,
            name,
            ip,
            team: raw.team,
            health: raw.health,
            armor: raw.armor,
            is_bot: raw.is_bot,
            is_connected: raw.is_connected,
            is_alive: raw.is_alive,
            position: raw.position,
        }
    }

    /// Fetch the current snapshot for `slot` from the host, or `None` if
    /// the callback bank isn't registered or the slot isn't connected.
    pub fn fetch(slot: i32) -> Option<Self> {
        let table = try_callbacks()?;
        let snapshot_fn = table.core.player_snapshot?;
        let raw = snapshot_fn(slot);
        if !raw.is_connected {
            return None;
        }
        let name = unsafe { crate::ffi_str::copy_c_string(raw.name) };
        let ip = unsafe { crate::ffi_str::copy_c_string(raw.ip) };
        Some(Self::from_raw(raw, name, ip))
    }
}

/// View over a native game event. In the `pre` phase, setters reach the
/// host; in `post` phase they are no-ops.
pub struct NativeEventView {
    handle: NativeEventHandle,
    name: String,
    can_modify: bool,
}

impl NativeEventView {
    pub fn new(handle: NativeEventHandle, name: impl Into<String>, can_modify: bool) -> Self {
        Self {
            handle,
            name: name.into(),
            can_modify,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn can_modify(&self) -> bool {
        self.can_modify
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_field(key).and_then(|v| match v.tag {
            SchemaValueTag::Int => Some(unsafe { v.value.int_value }),
            _ => None,
        })
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get_field(key).and_then(|v| match v.tag {
            SchemaValueTag::Float => Some(unsafe { v.value.float_value }),
            _ => None,
        })
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_field(key).and_then(|v| match v.tag {
            SchemaValueTag::Bool => Some(unsafe { v.value.bool_value }),
            _ => None,
        })
    }

    pub fn set_int(&self, key: &str, value: i64) {
        if self.can_modify {
            self.set_field(key, SchemaValueRaw::int(value));
        }
    }

    pub fn set_float(&self, key: &str, value: f64) {
        if self.can_modify {
            self.set_field(key, SchemaValueRaw::float(value));
        }
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        if self.can_modify {
            self.set_field(key, SchemaValueRaw::boolean(value));
        }
    }

    fn get_field(&self, key: &str) -> Option<SchemaValueRaw> {
        let table = try_callbacks()?;
        let get_fn = table.core.event_get_field?;
        let key_c = std::ffi::CString::new(key).ok()?;
        Some(get_fn(self.handle, key_c.as_ptr()))
    }

    fn set_field(&self, key: &str, value: SchemaValueRaw) {
        let Some(table) = try_callbacks() else { return };
        let Some(set_fn) = table.core.event_set_field else { return };
        let Ok(key_c) = std::ffi::CString::new(key) else { return };
        set_fn(self.handle, key_c.as_ptr(), value);
    }
}

/// Read-only damage event fields.
#[derive(Debug, Clone, Copy)]
pub struct DamageView {
    pub victim_slot: i32,
    pub attacker_slot: i32,
    pub damage: f32,
    pub damage_type: i32,
}

impl From<DamageEventRaw> for DamageView {
    fn from(raw: DamageEventRaw) -> Self {
        Self {
            victim_slot: raw.victim_slot,
            attacker_slot: raw.attacker_slot,
            damage: raw.damage,
            damage_type: raw.damage_type,
        }
    }
}
