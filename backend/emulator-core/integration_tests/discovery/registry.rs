use crate::helpers::{isolate_discovery, write_pid_file};

use emulator_core::discovery::EmulatorRegistry;

use serial_test::serial;

// ============================================================================
// Public API tests for the emulator registry
// Each test isolates discovery into a tempdir via ANDROID_EMULATOR_HOME,
// which every OS family consults.
// ============================================================================

/// **VALUE**: Verifies the single-emulator happy path end to end: one
/// metadata file, one record, correct port, adb-style name.
///
/// **WHY THIS MATTERS**: This is the configuration virtually every
/// developer machine has; if it breaks, nothing downstream works.
#[test]
#[serial]
fn given_single_insecure_emulator_when_discovering_then_record_matches_file() {
    // GIVEN: One published metadata file
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1234, "grpc.port=8554\nport.adb=5554\n");

    // WHEN: Scanning
    let registry = EmulatorRegistry::new();

    // THEN: Exactly that record comes back
    assert_eq!(registry.available(), 1);
    let info = registry.default_emulator().expect("default resolves");
    assert_eq!(info.pid, 1234);
    assert_eq!(info.grpc_port, 8554);
    assert_eq!(info.name().as_deref(), Some("emulator-5554"));
    assert!(!info.requires_tls());
    assert!(!info.requires_token());
}

/// **VALUE**: Verifies two emulators are both discovered, the default is
/// the lowest pid, and lookups by pid resolve the right instance.
#[test]
#[serial]
fn given_two_emulators_when_discovering_then_default_is_lowest_pid() {
    // GIVEN: Two published metadata files
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1000, "grpc.port=8554\n");
    write_pid_file(dir.path(), 2000, "grpc.port=8556\n");

    // WHEN: Scanning
    let registry = EmulatorRegistry::new();

    // THEN: Both visible, deterministic default, pid lookup exact
    assert_eq!(registry.available(), 2);
    assert_eq!(registry.default_emulator().expect("default").pid, 1000);
    assert_eq!(
        registry.find_by_pid(2000).expect("pid 2000 found").grpc_port,
        8556
    );
}

/// **VALUE**: Verifies a corrupt metadata file is skipped without
/// disturbing valid neighbors or raising at discovery time.
#[test]
#[serial]
fn given_corrupt_neighbor_file_when_discovering_then_only_valid_record_survives() {
    // GIVEN: One valid and one corrupt file
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1, "grpc.port=8554\n");
    write_pid_file(dir.path(), 2, "not_a_kv_pair\n");

    // WHEN: Scanning
    let registry = EmulatorRegistry::new();

    // THEN: Only pid 1 is visible
    assert_eq!(registry.available(), 1);
    let all = registry.find_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].pid, 1);
    assert!(registry.find_by_pid(2).is_none());
}

/// **VALUE**: Verifies an unknown pid resolves to absence, not to some
/// other emulator.
#[test]
#[serial]
fn given_unknown_pid_when_looking_up_then_returns_none() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 1, "grpc.port=8554\n");

    let registry = EmulatorRegistry::new();

    assert!(registry.find_by_pid(99).is_none());
}

/// **VALUE**: Verifies `find_all` orders records ascending by pid
/// regardless of directory enumeration order.
#[test]
#[serial]
fn given_unordered_files_when_listing_then_records_are_ascending_by_pid() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    write_pid_file(dir.path(), 3000, "grpc.port=8558\n");
    write_pid_file(dir.path(), 1000, "grpc.port=8554\n");
    write_pid_file(dir.path(), 2000, "grpc.port=8556\n");

    let pids: Vec<u32> = EmulatorRegistry::new()
        .find_all()
        .into_iter()
        .map(|info| info.pid)
        .collect();

    assert_eq!(pids, vec![1000, 2000, 3000]);
}

/// **VALUE**: Verifies every operation rescans: a file added after the
/// first call is visible to the next one.
///
/// **WHY THIS MATTERS**: Caching across calls would hide emulator
/// restarts, which is precisely the event discovery exists to observe.
#[test]
#[serial]
fn given_file_added_between_calls_when_rescanning_then_new_record_appears() {
    let dir = tempfile::tempdir().expect("tempdir");
    isolate_discovery(dir.path());
    let registry = EmulatorRegistry::new();

    assert_eq!(registry.available(), 0);

    write_pid_file(dir.path(), 42, "grpc.port=8554\n");

    assert_eq!(registry.available(), 1);
    assert_eq!(registry.default_emulator().expect("default").pid, 42);
}

/// **VALUE**: Verifies the first directory in resolution order wins when
/// two directories publish the same pid.
///
/// **BUG THIS CATCHES**: Would catch a later directory overwriting an
/// earlier record, which silently flips which endpoint a pid resolves to.
#[cfg(target_os = "linux")]
#[test]
#[serial]
fn given_duplicate_pid_across_directories_when_scanning_then_first_directory_wins() {
    use crate::helpers::set_env;

    // GIVEN: The runtime dir and the android home both publish pid 7
    let runtime = tempfile::tempdir().expect("tempdir");
    let android = tempfile::tempdir().expect("tempdir");
    isolate_discovery(android.path());
    set_env("XDG_RUNTIME_DIR", runtime.path());
    write_pid_file(runtime.path(), 7, "grpc.port=8554\n");
    write_pid_file(android.path(), 7, "grpc.port=9999\n");

    // WHEN: Scanning
    let registry = EmulatorRegistry::new();

    // THEN: The runtime dir's record is the one that survives
    assert_eq!(registry.available(), 1);
    assert_eq!(
        registry.find_by_pid(7).expect("pid 7 found").grpc_port,
        8554
    );
}

/// **VALUE**: Verifies a runtime-dir publication is discovered through
/// `XDG_RUNTIME_DIR` alone, the way the emulator publishes on stock
/// Linux desktops.
#[cfg(target_os = "linux")]
#[test]
#[serial]
fn given_runtime_dir_publication_when_discovering_then_record_is_found() {
    use crate::helpers::set_env;

    let runtime = tempfile::tempdir().expect("tempdir");
    let empty = tempfile::tempdir().expect("tempdir");
    isolate_discovery(empty.path());
    set_env("XDG_RUNTIME_DIR", runtime.path());
    write_pid_file(runtime.path(), 1234, "grpc.port=8554\nport.adb=5554\n");

    let info = EmulatorRegistry::new()
        .default_emulator()
        .expect("default resolves");

    assert_eq!(info.pid, 1234);
    assert_eq!(info.name().as_deref(), Some("emulator-5554"));
}
