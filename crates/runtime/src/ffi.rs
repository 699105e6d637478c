//! The single exported C ABI boundary.
//!
//! Every function here is `#[no_mangle] extern "C"`, takes only integer
//! and pointer arguments, and never lets a panic unwind into the host's
//! C++ call stack: each body runs inside [`gostrike_engine::guard`] (or
//! [`gostrike_engine::guard_value`] for the ones that return a value),
//! which catches a panic, records its message for `GetLastError`, and
//! reports `BoundaryStatus::Panic` instead.
//!
//! Opaque native pointers (`event`, entity indices) are stored and
//! forwarded back through the callback table but never dereferenced
//! here — the host owns their memory.

use std::ffi::c_char;
use std::net::SocketAddr;

use parking_lot::Mutex;
use tracing_subscriber::prelude::*;

use gostrike_core::config::CoreConfig;
use gostrike_core::events::{Phase, EVENTS};
use gostrike_core::ffi_str::copy_c_string;
use gostrike_core::logging::{self, LogLevel};
use gostrike_core::{commands, on_tick};
use gostrike_engine::{self as engine, guard, guard_value};
use gostrike_sdk::{
    BoundaryStatus, CallbackTable, DamageEventRaw, EventResult, NativeEventHandle, PlayerInfoRaw,
    ABI_VERSION,
};

/// Guards `Init`/`Shutdown` and every other export against running
/// before `Init` or after `Shutdown`. Distinct from
/// `gostrike_engine::globals`'s callback-table slot: `Init` succeeds
/// (loading config, starting the HTTP control plane, loading plugins)
/// whether or not the host has called `RegisterCallbacks` yet — that
/// call happens afterward.
static INITIALIZED: Mutex<bool> = Mutex::new(false);

/// The HTTP control plane, started in `Init` and stopped in `Shutdown`.
static HTTP_SERVER: Mutex<Option<gostrike_http::Server>> = Mutex::new(None);

fn require_initialized() -> Result<(), String> {
    if *INITIALIZED.lock() {
        Ok(())
    } else {
        Err("gostrike runtime not initialized".to_string())
    }
}

/// `Init()`: idempotent, loads configuration, installs the log
/// forwarder, starts the ambient subsystems and the HTTP control plane,
/// then runs the plugin load sequence. A second call while already
/// initialized is a no-op returning `Ok`.
#[no_mangle]
pub extern "C" fn Init() -> BoundaryStatus {
    guard(|| {
        let mut initialized = INITIALIZED.lock();
        if *initialized {
            return Ok(());
        }

        let config = CoreConfig::load().map_err(|e| e.to_string())?;

        let level = LogLevel::parse(&config.log_level).unwrap_or(LogLevel::Info);
        logging::set_level(level);
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(logging::ForwardingLayer)
            .try_init();

        gostrike_core::init().map_err(|e| e.to_string())?;

        let addr: SocketAddr = config
            .http_bind
            .parse()
            .map_err(|e| format!("invalid http_bind {:?}: {e}", config.http_bind))?;
        let server = gostrike_http::Server::start(addr).map_err(|e| e.to_string())?;
        *HTTP_SERVER.lock() = Some(server);

        *initialized = true;
        tracing::info!(abi_version = ABI_VERSION, "gostrike initialized");
        Ok(())
    })
}

/// `Shutdown()`: reverses `Init` if initialized, idempotent otherwise.
#[no_mangle]
pub extern "C" fn Shutdown() -> BoundaryStatus {
    guard(|| {
        let mut initialized = INITIALIZED.lock();
        if !*initialized {
            return Ok(());
        }

        gostrike_core::shutdown();
        if let Some(mut server) = HTTP_SERVER.lock().take() {
            server.stop();
        }
        engine::clear();

        *initialized = false;
        tracing::info!("gostrike shut down");
        Ok(())
    })
}

/// `RegisterCallbacks(callbackTable)`: stores the host's function-pointer
/// vtable. A later call replaces the earlier one
/// (`gostrike_engine::register_callbacks`).
#[no_mangle]
pub extern "C" fn RegisterCallbacks(table: CallbackTable) -> BoundaryStatus {
    guard(|| {
        engine::register_callbacks(table);
        tracing::debug!("callback table registered");
        Ok(())
    })
}

/// `OnTick(deltaSeconds)`: advances the scheduler then invokes tick
/// handlers.
#[no_mangle]
pub extern "C" fn OnTick(delta_seconds: f64) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        on_tick(delta_seconds);
        Ok(())
    })
}

/// `OnEvent(event, isPost) -> result`: dispatches a native game event by
/// interned name. `can_modify = !is_post`.
///
/// # Safety
/// `event` is an opaque handle only ever forwarded back to the host
/// through the callback table; this function never dereferences it.
/// `event_name` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnEvent(
    event: NativeEventHandle,
    event_name: *const c_char,
    is_post: bool,
) -> EventResult {
    let mut result = EventResult::Continue;
    guard_value(&mut result, EventResult::Continue, || {
        require_initialized()?;
        let name = copy_c_string(event_name);
        let phase = if is_post { Phase::Post } else { Phase::Pre };
        Ok(EVENTS.dispatch_native(&name, phase, event))
    });
    result
}

/// Dispatches a `player_hurt`-style damage event. Damage events carry
/// read-only victim/attacker/damage/type fields rather than the generic
/// get/set-field view `OnEvent` exposes, so they get their own export —
/// see `DESIGN.md` for the rationale.
#[no_mangle]
pub extern "C" fn OnDamage(event: DamageEventRaw) -> EventResult {
    let mut result = EventResult::Continue;
    guard_value(&mut result, EventResult::Continue, || {
        require_initialized()?;
        Ok(EVENTS.dispatch_damage(event))
    });
    result
}

/// `OnPlayerConnect(playerSnapshot)`.
#[no_mangle]
pub extern "C" fn OnPlayerConnect(info: PlayerInfoRaw) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        let name = unsafe { copy_c_string(info.name) };
        let ip = unsafe { copy_c_string(info.ip) };
        EVENTS.dispatch_player_connect(info, name, ip);
        Ok(())
    })
}

/// `OnPlayerDisconnect(slot, reason)`.
///
/// # Safety
/// `reason` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnPlayerDisconnect(slot: i32, reason: *const c_char) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        let reason = copy_c_string(reason);
        EVENTS.dispatch_player_disconnect(slot, &reason);
        Ok(())
    })
}

/// `OnMapChange(mapName)`.
///
/// # Safety
/// `map_name` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnMapChange(map_name: *const c_char) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        let name = copy_c_string(map_name);
        EVENTS.dispatch_map_change(&name);
        Ok(())
    })
}

/// `OnEntityCreated(index, className)`.
///
/// # Safety
/// `class_name` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnEntityCreated(index: i32, class_name: *const c_char) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        let name = copy_c_string(class_name);
        EVENTS.dispatch_entity_created(index, &name);
        Ok(())
    })
}

/// `OnEntitySpawned(index, className)`.
///
/// # Safety
/// `class_name` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnEntitySpawned(index: i32, class_name: *const c_char) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        let name = copy_c_string(class_name);
        EVENTS.dispatch_entity_spawned(index, &name);
        Ok(())
    })
}

/// `OnEntityDeleted(index)`.
#[no_mangle]
pub extern "C" fn OnEntityDeleted(index: i32) -> BoundaryStatus {
    guard(|| {
        require_initialized()?;
        EVENTS.dispatch_entity_deleted(index);
        Ok(())
    })
}

/// `OnChatMessage(slot, message) -> bool`: `true` iff the message
/// resolved to a registered chat command and the underlying chat
/// broadcast should be suppressed.
///
/// # Safety
/// `message` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnChatMessage(slot: i32, message: *const c_char) -> bool {
    let mut handled = false;
    guard_value(&mut handled, false, || {
        require_initialized()?;
        let text = copy_c_string(message);
        Ok(commands::dispatch(slot, &text))
    });
    handled
}

/// `OnConsoleCommand(slot, steamId, line) -> bool`: the console-command
/// counterpart of `OnChatMessage`. `steam_id = 0` means the host's own
/// console, not a connected player.
///
/// # Safety
/// `line` must be null or a valid NUL-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn OnConsoleCommand(slot: i32, steam_id: u64, line: *const c_char) -> bool {
    let mut handled = false;
    guard_value(&mut handled, false, || {
        require_initialized()?;
        let text = copy_c_string(line);
        let steam_id = if steam_id == 0 { None } else { Some(steam_id) };
        Ok(commands::dispatch_console(slot, steam_id, &text))
    });
    handled
}

/// `GetLastError()`: the most recent panic or recovered-error message,
/// or null if none is recorded. Ownership transfers to the host, which
/// must free it through [`FreeLastError`] — the one runtime-allocated
/// output this boundary hands across.
#[no_mangle]
pub extern "C" fn GetLastError() -> *mut c_char {
    let mut ptr = std::ptr::null_mut();
    guard_value(&mut ptr, std::ptr::null_mut(), || {
        Ok(match engine::last_error() {
            Some(message) => std::ffi::CString::new(message).unwrap_or_default().into_raw(),
            None => std::ptr::null_mut(),
        })
    });
    ptr
}

/// Frees a string previously returned by [`GetLastError`].
///
/// # Safety
/// `ptr` must be null, or a pointer previously returned by
/// [`GetLastError`] and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn FreeLastError(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(std::ffi::CString::from_raw(ptr));
    }
}

/// `ClearLastError()`.
#[no_mangle]
pub extern "C" fn ClearLastError() -> BoundaryStatus {
    guard(|| {
        engine::clear_last_error();
        Ok(())
    })
}

/// `GetABIVersion()`: bumped whenever the shape of [`CallbackTable`] or
/// an exported signature changes in a way the host must know about.
#[no_mangle]
pub extern "C" fn GetABIVersion() -> u32 {
    ABI_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    // `INITIALIZED`, `HTTP_SERVER`, and the engine's last-error slot are
    // process-wide statics; `Init`/`Shutdown` additionally bind a real
    // TCP listener and touch the filesystem. Exercising those belongs to
    // an end-to-end harness driving the built `cdylib`, not a unit test
    // that shares a test binary (and its statics) with everything else
    // in this module. These tests stick to effects that are either pure
    // or safely observable without assuming exclusive ownership of that
    // global state.

    #[test]
    fn abi_version_is_stable() {
        assert_eq!(GetABIVersion(), ABI_VERSION);
    }

    #[test]
    fn free_last_error_accepts_null() {
        unsafe { FreeLastError(std::ptr::null_mut()) };
    }

    #[test]
    fn get_last_error_round_trips_through_free() {
        engine::clear_last_error();
        assert!(GetLastError().is_null());

        engine::guard(|| Err("boom".to_string()));
        let ptr = GetLastError();
        assert!(!ptr.is_null());
        unsafe {
            let msg = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
            assert_eq!(msg, "boom");
            FreeLastError(ptr);
        }
        ClearLastError();
        assert!(engine::last_error().is_none());
    }
}
