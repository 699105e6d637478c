//! Plain-old-data types passed across the boundary.
//!
//! Strings are always non-owning `*const c_char` pointers into memory the
//! host controls; the receiving side must copy them into an owned `String`
//! before returning, since the pointer is only valid for the duration of
//! the call that handed it over.

use std::ffi::c_char;
use std::os::raw::c_void;

/// Outcome of dispatching a single handler in an ordered chain (event
/// listeners, chat/console commands). Handlers run in registration order;
/// the chain stops early once a handler reports [`EventResult::Stop`].
///
/// The ladder is ordered: a later variant always outranks an earlier one
/// when multiple handlers report different results for the same dispatch.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventResult {
    /// Handler did nothing of note; continue to the next one.
    Continue = 0,
    /// Handler observed or mutated the event but other handlers should
    /// still run.
    Changed = 1,
    /// Handler fully handled the event; later handlers still run but the
    /// event should be considered consumed.
    Handled = 2,
    /// Handler demands that no further handlers run.
    Stop = 3,
}

impl Default for EventResult {
    fn default() -> Self {
        Self::Continue
    }
}

/// Where a printed message should be displayed on the client.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatDestination {
    Console = 0,
    Chat = 1,
    Center = 2,
    Alert = 3,
}

/// A snapshot of one connected player's state, filled in by the host and
/// handed to the core by value. The `name` and `ip` pointers are only
/// valid for the duration of the call that produced this struct.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PlayerInfoRaw {
    /// 0-based server slot, stable for the lifetime of the connection.
    pub slot: i32,
    /// Engine userid, distinct from the slot.
    pub user_id: i32,
    /// 64-bit Steam ID, or 0 for a bot / not yet authenticated.
    pub steam_id: u64,
    pub name: *const c_char,
    pub ip: *const c_char,
    pub team: i32,
    pub health: i32,
    pub armor: i32,
    pub is_bot: bool,
    pub is_connected: bool,
    pub is_alive: bool,
    pub position: [f32; 3],
}

/// Fields of a `player_hurt`-style damage event, read-only from the core's
/// perspective. Slots are -1 when there is no attacker (world damage).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DamageEventRaw {
    pub victim_slot: i32,
    pub attacker_slot: i32,
    pub damage: f32,
    pub damage_type: i32,
    pub health_remaining: i32,
}

/// Discriminant for [`SchemaValueRaw`].
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaValueTag {
    Int = 0,
    Float = 1,
    Bool = 2,
    String = 3,
    Vector = 4,
}

/// Tagged union used for generic entity-field and native-event-field
/// access, where the underlying type varies by field name and is only
/// known at the call site, not at compile time.
#[repr(C)]
#[derive(Clone, Copy)]
pub union SchemaValueUnion {
    pub int_value: i64,
    pub float_value: f64,
    pub bool_value: bool,
    /// Non-owning pointer, valid only for the duration of the call.
    pub string_value: *const c_char,
    pub vector_value: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct SchemaValueRaw {
    pub tag: SchemaValueTag,
    pub value: SchemaValueUnion,
}

impl SchemaValueRaw {
    pub fn int(v: i64) -> Self {
        Self {
            tag: SchemaValueTag::Int,
            value: SchemaValueUnion { int_value: v },
        }
    }

    pub fn float(v: f64) -> Self {
        Self {
            tag: SchemaValueTag::Float,
            value: SchemaValueUnion { float_value: v },
        }
    }

    pub fn boolean(v: bool) -> Self {
        Self {
            tag: SchemaValueTag::Bool,
            value: SchemaValueUnion { bool_value: v },
        }
    }
}

/// Opaque handle to a native event instance, valid only while the
/// dispatching call is on the stack. Never stored past the call.
pub type NativeEventHandle = *mut c_void;
