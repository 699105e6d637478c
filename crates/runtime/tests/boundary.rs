//! End-to-end exercise of the exported boundary against a real (if
//! ephemeral) config directory and HTTP listener.
//!
//! Deliberately a single test function: `Init`/`Shutdown` touch process-
//! wide statics (`gostrike_engine`'s callback table and last-error slot,
//! this crate's own init sentinel), so interleaving it with a sibling
//! test in the same binary would be racy. A real deployment only ever
//! has one native host calling these functions anyway.

use gostrike_runtime::ffi;
use gostrike_sdk::BoundaryStatus;

#[test]
fn full_boundary_lifecycle() {
    let base = tempfile::tempdir().expect("tempdir");
    std::env::set_var("GOSTRIKE_BASE_DIR", base.path());

    let configs_dir = base.path().join("configs");
    std::fs::create_dir_all(&configs_dir).expect("create configs dir");
    std::fs::write(
        configs_dir.join("core.json"),
        r#"{"version":"1","log_level":"debug","http_bind":"127.0.0.1:0"}"#,
    )
    .expect("write core config");

    // Calling an event dispatcher before `Init` reports NotInitialized
    // and never panics.
    assert_eq!(ffi::OnTick(0.016), BoundaryStatus::NotInitialized);

    assert_eq!(ffi::Init(), BoundaryStatus::Ok);
    // Init() is idempotent.
    assert_eq!(ffi::Init(), BoundaryStatus::Ok);

    assert_eq!(ffi::GetABIVersion(), gostrike_sdk::ABI_VERSION);

    assert_eq!(ffi::OnTick(0.016), BoundaryStatus::Ok);

    // No callback table registered yet: player lookups fail closed and
    // chat dispatch of a non-command message is a no-op, not a panic.
    let handled = unsafe { ffi::OnChatMessage(0, std::ptr::null()) };
    assert!(!handled);

    let table = gostrike_sdk::CallbackTable::default();
    assert_eq!(ffi::RegisterCallbacks(table), BoundaryStatus::Ok);

    assert_eq!(ffi::Shutdown(), BoundaryStatus::Ok);
    // Shutdown() is idempotent.
    assert_eq!(ffi::Shutdown(), BoundaryStatus::Ok);

    // Once shut down, dispatch is rejected again.
    assert_eq!(ffi::OnTick(0.016), BoundaryStatus::NotInitialized);
}
