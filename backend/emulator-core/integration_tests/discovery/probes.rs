use crate::helpers::isolate_discovery;

use emulator_core::discovery::process::{is_alive, is_listening, wait_for_emulator};

use std::time::{Duration, Instant};

use serial_test::serial;

/// **VALUE**: Verifies liveness detection against a process guaranteed
/// to exist: our own.
#[test]
fn given_own_pid_when_checking_liveness_then_returns_true() {
    assert!(is_alive(std::process::id()));
}

/// **VALUE**: Verifies a pid that cannot exist reads as dead rather than
/// erroring.
///
/// **WHY THIS MATTERS**: Stale metadata files reference dead pids by
/// definition; the probe exists to classify them, so it must not fail on
/// them.
#[test]
fn given_nonexistent_pid_when_checking_liveness_then_returns_false() {
    assert!(!is_alive(u32::MAX));
}

/// **VALUE**: Verifies the port probe reports no listener on a port
/// nothing can bind.
#[test]
fn given_unbound_port_when_checking_listener_then_returns_false() {
    // Port 0 is never a real listening port.
    let listening = is_listening(0).expect("socket query should succeed");
    assert!(!listening);
}

/// **VALUE**: Verifies the wait helper gives up within its deadline when
/// no emulator ever appears, instead of hanging the caller.
#[test]
#[serial]
fn given_no_emulator_when_waiting_then_returns_none_within_deadline() {
    // GIVEN: Discovery isolated into an empty directory
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());

    // WHEN: Waiting with a one-second budget
    let started = Instant::now();
    let result = wait_for_emulator(Duration::from_secs(1));

    // THEN: Gives up empty-handed, within a generous margin of the budget
    assert!(result.is_none());
    assert!(started.elapsed() < Duration::from_secs(10));
}
