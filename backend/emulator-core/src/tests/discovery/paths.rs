// Unit tests for the pure directory resolution table.
// Integration tests for on-disk scanning are in integration_tests/discovery/.

use crate::discovery::paths::{OsFamily, candidate_directories};

use std::collections::HashMap;
use std::path::PathBuf;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn running(base: impl Into<PathBuf>) -> PathBuf {
    base.into().join("avd").join("running")
}

/// **VALUE**: Verifies the Linux resolution order: runtime dir first, the
/// per-uid fallback second.
///
/// **WHY THIS MATTERS**: The emulator publishes under the first of these
/// that exists; scanning them out of order would resolve a different
/// instance than the emulator's own tooling does.
#[test]
fn given_linux_with_runtime_dir_when_resolving_then_runtime_dir_is_first() {
    // GIVEN: A Linux environment with XDG_RUNTIME_DIR set
    let env = env(&[("XDG_RUNTIME_DIR", "/tmp/runtime-foo")]);

    // WHEN: Resolving candidates
    let candidates = candidate_directories(OsFamily::Linux, &env, 1000);

    // THEN: Runtime dir leads, per-uid fallback follows, both under avd/running
    assert_eq!(
        candidates,
        vec![running("/tmp/runtime-foo"), running("/run/user/1000")]
    );
}

/// **VALUE**: Verifies that `ANDROID_EMULATOR_HOME` shadows
/// `ANDROID_SDK_HOME/.android` in the Linux android-home fallback.
#[test]
fn given_linux_with_both_android_vars_when_resolving_then_emulator_home_wins() {
    // GIVEN: Both android home variables set
    let env = env(&[
        ("ANDROID_EMULATOR_HOME", "/opt/emu-home"),
        ("ANDROID_SDK_HOME", "/opt/sdk"),
    ]);

    // WHEN: Resolving candidates
    let candidates = candidate_directories(OsFamily::Linux, &env, 500);

    // THEN: The emulator home contributes the android candidate; the SDK
    // path does not appear
    assert_eq!(
        candidates,
        vec![running("/run/user/500"), running("/opt/emu-home")]
    );
}

/// **VALUE**: Verifies the SDK-derived fallback gains the `.android`
/// segment.
#[test]
fn given_linux_with_sdk_home_only_when_resolving_then_dot_android_is_appended() {
    let env = env(&[("ANDROID_SDK_HOME", "/opt/sdk")]);

    let candidates = candidate_directories(OsFamily::Linux, &env, 500);

    assert_eq!(
        candidates,
        vec![
            running("/run/user/500"),
            running(PathBuf::from("/opt/sdk").join(".android")),
        ]
    );
}

/// **VALUE**: Verifies the macOS primary location and that both android
/// fallbacks contribute separate candidates.
#[test]
fn given_macos_environment_when_resolving_then_temporary_items_is_first() {
    // GIVEN: A macOS environment with every source set
    let env = env(&[
        ("HOME", "/Users/dev"),
        ("ANDROID_EMULATOR_HOME", "/opt/emu-home"),
        ("ANDROID_SDK_HOME", "/opt/sdk"),
    ]);

    // WHEN: Resolving candidates
    let candidates = candidate_directories(OsFamily::MacOs, &env, 501);

    // THEN: TemporaryItems leads, then each android source in order
    assert_eq!(
        candidates,
        vec![
            running(
                PathBuf::from("/Users/dev")
                    .join("Library")
                    .join("Caches")
                    .join("TemporaryItems")
            ),
            running("/opt/emu-home"),
            running(PathBuf::from("/opt/sdk").join(".android")),
        ]
    );
}

/// **VALUE**: Verifies the Windows fallback chain when `LOCALAPPDATA` is
/// unset: the SDK-derived `.android` directory must still be reachable.
///
/// **BUG THIS CATCHES**: Would catch the fallback being skipped entirely
/// when the primary source is missing, which leaves emulators
/// undiscoverable on hosts without a profile temp directory.
#[test]
fn given_windows_without_localappdata_when_resolving_then_sdk_fallback_remains() {
    // GIVEN: LOCALAPPDATA unset, only the SDK home available
    let env = env(&[("ANDROID_SDK_HOME", "C:\\sdk")]);

    // WHEN: Resolving candidates
    let candidates = candidate_directories(OsFamily::Windows, &env, 0);

    // THEN: Exactly the SDK-derived candidate survives
    assert_eq!(
        candidates,
        vec![running(PathBuf::from("C:\\sdk").join(".android"))]
    );
}

/// **VALUE**: Verifies the resolver is pure: identical inputs produce
/// identical output lists.
#[test]
fn given_identical_inputs_when_resolving_twice_then_lists_are_equal() {
    let env = env(&[
        ("XDG_RUNTIME_DIR", "/tmp/runtime-a"),
        ("ANDROID_SDK_HOME", "/opt/sdk"),
    ]);

    let first = candidate_directories(OsFamily::Linux, &env, 42);
    let second = candidate_directories(OsFamily::Linux, &env, 42);

    assert_eq!(first, second);
}

/// **VALUE**: Verifies empty environment values count as unset rather
/// than producing a candidate rooted at the empty path.
#[test]
fn given_empty_env_values_when_resolving_then_they_contribute_nothing() {
    let env = env(&[("XDG_RUNTIME_DIR", ""), ("ANDROID_SDK_HOME", "")]);

    let candidates = candidate_directories(OsFamily::Linux, &env, 7);

    assert_eq!(candidates, vec![running("/run/user/7")]);
}
