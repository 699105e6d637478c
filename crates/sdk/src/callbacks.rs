//! The callback table the host registers during `Init`.
//!
//! The host owns the game; the core never touches engine memory directly.
//! Instead every operation that needs to reach into the game (printing to
//! a client, reading a player's health, looking up a convar) goes back out
//! through one of these function pointers. The table is split into banks
//! by concern, mirroring how the host itself separates client messaging,
//! entity/schema access, and gameplay mutation.
//!
//! Every field is `Option<extern "C" fn(...)>` so a host that doesn't
//! implement a given bank (e.g. a test harness that only drives events) can
//! leave it null; callers must check before invoking.

use std::ffi::c_char;
use std::os::raw::c_void;

use crate::types::{ChatDestination, NativeEventHandle, PlayerInfoRaw, SchemaValueRaw};

/// Messaging and introspection primitives used by almost every subsystem.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CoreBank {
    /// Forward a structured log line to the host's own logging sink, in
    /// addition to (or instead of) this process's own `tracing` output.
    pub log: Option<extern "C" fn(level: i32, target: *const c_char, message: *const c_char)>,
    /// Run a string as a server console command, as if typed at the host console.
    pub exec_command: Option<extern "C" fn(command: *const c_char)>,
    /// Number of connected client slots, used to bound slot iteration.
    pub max_slots: Option<extern "C" fn() -> i32>,
    /// Current map name, or null if none is loaded.
    pub map_name: Option<extern "C" fn() -> *const c_char>,
    /// Server tickrate in Hz, used to size the scheduler's tick budget.
    pub tick_interval: Option<extern "C" fn() -> f32>,
    /// Read an arbitrary field off a native event instance by key name.
    pub event_get_field:
        Option<extern "C" fn(event: NativeEventHandle, key: *const c_char) -> SchemaValueRaw>,
    /// Write an arbitrary field on a native event instance by key name.
    pub event_set_field:
        Option<extern "C" fn(event: NativeEventHandle, key: *const c_char, value: SchemaValueRaw)>,
    /// Snapshot a connected player's current state by slot. The returned
    /// struct's `name`/`ip` pointers are only valid for the duration of
    /// this call; the core copies them into owned `String`s immediately.
    pub player_snapshot: Option<extern "C" fn(slot: i32) -> PlayerInfoRaw>,
    /// Resolve a player's slot from their 64-bit Steam ID, or -1 if not
    /// connected.
    pub slot_for_steam_id: Option<extern "C" fn(steam_id: u64) -> i32>,
}

impl Default for CoreBank {
    fn default() -> Self {
        // SAFETY: all fields are `Option<fn ptr>`, for which the all-zero
        // bit pattern is a valid `None`.
        unsafe { std::mem::zeroed() }
    }
}

/// Entity and schema field access.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EntityBank {
    /// Resolve a player slot to its entity index, or -1 if not spawned.
    pub entity_index_for_slot: Option<extern "C" fn(slot: i32) -> i32>,
    /// True if the given entity index currently refers to a live entity.
    pub entity_is_valid: Option<extern "C" fn(entity_index: i32) -> bool>,
    /// Read a schema field by class + field name off an entity.
    pub entity_get_field: Option<
        extern "C" fn(
            entity_index: i32,
            class_name: *const c_char,
            field_name: *const c_char,
        ) -> SchemaValueRaw,
    >,
    /// Write a schema field by class + field name on an entity.
    pub entity_set_field: Option<
        extern "C" fn(
            entity_index: i32,
            class_name: *const c_char,
            field_name: *const c_char,
            value: SchemaValueRaw,
        ),
    >,
}

impl Default for EntityBank {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

/// Gameplay mutation: convars and player state that plugins commonly change.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct GameplayBank {
    pub convar_get_string: Option<extern "C" fn(name: *const c_char) -> *const c_char>,
    pub convar_get_float: Option<extern "C" fn(name: *const c_char) -> f64>,
    pub convar_set_string: Option<extern "C" fn(name: *const c_char, value: *const c_char)>,
    pub convar_set_float: Option<extern "C" fn(name: *const c_char, value: f64)>,
    pub kick_player: Option<extern "C" fn(slot: i32, reason: *const c_char)>,
    pub slay_player: Option<extern "C" fn(slot: i32)>,
    pub respawn_player: Option<extern "C" fn(slot: i32)>,
    pub change_team: Option<extern "C" fn(slot: i32, team: i32)>,
    pub teleport_player: Option<extern "C" fn(slot: i32, position: *const [f32; 3])>,
}

impl Default for GameplayBank {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

/// Client and server text output.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CommBank {
    pub client_print:
        Option<extern "C" fn(slot: i32, destination: ChatDestination, message: *const c_char)>,
    pub broadcast_print: Option<extern "C" fn(destination: ChatDestination, message: *const c_char)>,
}

impl Default for CommBank {
    fn default() -> Self {
        unsafe { std::mem::zeroed() }
    }
}

/// The full set of banks, registered by the host in one call during `Init`.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct CallbackTable {
    pub core: CoreBank,
    pub entity: EntityBank,
    pub gameplay: GameplayBank,
    pub comm: CommBank,
    /// Host-owned opaque context pointer, passed back unchanged on every
    /// callback invocation the host needs it for. Unused by the callback
    /// signatures above today; reserved so the table doesn't need an ABI
    /// bump the first time one needs it.
    pub host_context: *mut c_void,
}

// SAFETY: the table is only ever read from the game thread the host calls
// `Init`/`OnTick` from; it is stored but never mutated after registration.
unsafe impl Send for CallbackTable {}
unsafe impl Sync for CallbackTable {}
