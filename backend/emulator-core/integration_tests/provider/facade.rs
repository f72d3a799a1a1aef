use crate::helpers::{isolate_discovery, write_pid_file};

use emulator_core::error::{CoreError, DiscoveryError};
use emulator_core::provider::{default_emulator, emulator_by_pid, list_emulators};

use serial_test::serial;

// ============================================================================
// Public API tests for the facade: typed errors, no silent fallback, no
// process exits.
// ============================================================================

/// **VALUE**: Verifies zero discoverable emulators surfaces as the
/// distinct "none found" error.
#[test]
#[serial]
fn given_no_emulators_when_requesting_default_then_returns_no_emulator_found() {
    // GIVEN: An empty discovery directory
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());

    // WHEN: Requesting the default emulator
    let result = default_emulator();

    // THEN: The distinct error kind
    assert!(matches!(
        result,
        Err(CoreError::Discovery(DiscoveryError::NoEmulatorFound { .. }))
    ));
}

/// **VALUE**: Verifies an explicitly requested pid that is absent is an
/// error naming that pid, never a silent fallback to another instance.
///
/// **WHY THIS MATTERS**: Falling back would route calls meant for one
/// device to a different one; for anything stateful (snapshots, input)
/// that is corruption, not convenience.
#[test]
#[serial]
fn given_absent_pid_when_requesting_it_then_returns_emulator_not_found() {
    // GIVEN: Only pid 1 is publishing
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1, "grpc.port=8554\n");

    // WHEN: Requesting pid 99
    let error = emulator_by_pid(99).err().expect("pid 99 must not resolve");

    // THEN: The error names the missing pid
    match error {
        CoreError::Discovery(DiscoveryError::EmulatorNotFound { pid, .. }) => {
            assert_eq!(pid, 99);
        }
        other => panic!("expected EmulatorNotFound, got {other}"),
    }
}

/// **VALUE**: Verifies the default resolves to the lowest pid and
/// carries the record through to the wrapper.
#[test]
#[serial]
fn given_two_emulators_when_requesting_default_then_lowest_pid_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1000, "grpc.port=8554\nport.adb=5554\n");
    write_pid_file(dir.path(), 2000, "grpc.port=8556\n");

    let emulator = default_emulator().expect("default resolves");

    assert_eq!(emulator.pid(), 1000);
    assert_eq!(emulator.name().as_deref(), Some("emulator-5554"));
    assert_eq!(emulator.info().grpc_port, 8554);
}

/// **VALUE**: Verifies an explicitly requested pid resolves to exactly
/// that instance.
#[test]
#[serial]
fn given_two_emulators_when_requesting_by_pid_then_exact_instance_returns() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1000, "grpc.port=8554\n");
    write_pid_file(dir.path(), 2000, "grpc.port=8556\n");

    let emulator = emulator_by_pid(2000).expect("pid 2000 resolves");

    assert_eq!(emulator.pid(), 2000);
    assert_eq!(emulator.info().grpc_port, 8556);
}

/// **VALUE**: Verifies every typed-client accessor works on a discovered
/// record: the channel builds lazily (no emulator is actually listening
/// here) and each service gets a client over it.
///
/// **WHY THIS MATTERS**: This is the full facade path a sample client
/// takes before its first RPC; a regression in channel caching or client
/// construction breaks every consumer at once.
#[tokio::test]
#[serial]
async fn given_discovered_emulator_when_requesting_clients_then_all_accessors_succeed() {
    // GIVEN: A discovered emulator with no credential material anywhere
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 4321, "grpc.port=8554\n");

    let emulator = default_emulator().expect("default resolves");

    // WHEN / THEN: Every accessor yields a client over the cached channel
    assert!(emulator.controller().is_ok());
    assert!(emulator.snapshots().is_ok());
    assert!(emulator.ui().is_ok());
    assert!(emulator.vhci().is_ok());
    assert!(!emulator.channel().expect("channel cached").is_authenticated());
}

/// **VALUE**: Verifies listing wraps every record, in ascending pid
/// order.
#[test]
#[serial]
fn given_several_emulators_when_listing_then_all_come_back_ascending() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 300, "grpc.port=8558\n");
    write_pid_file(dir.path(), 100, "grpc.port=8554\n");
    write_pid_file(dir.path(), 200, "grpc.port=8556\n");

    let pids: Vec<u32> = list_emulators().iter().map(|e| e.pid()).collect();

    assert_eq!(pids, vec![100, 200, 300]);
}
