// Shared fixtures for the integration suite.
//
// Discovery reads the real process environment, so every test that calls
// these helpers must hold the #[serial] lock: the unsafe env mutation is
// sound only while nothing else touches the environment.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub fn set_env(key: &str, value: impl AsRef<OsStr>) {
    // SAFETY: callers are #[serial]; no concurrent environment access.
    unsafe { std::env::set_var(key, value) }
}

pub fn remove_env(key: &str) {
    // SAFETY: callers are #[serial]; no concurrent environment access.
    unsafe { std::env::remove_var(key) }
}

/// Point discovery at `dir` and nothing else the environment controls.
pub fn isolate_discovery(dir: &Path) {
    set_env("ANDROID_EMULATOR_HOME", dir);
    remove_env("ANDROID_SDK_HOME");
    remove_env("XDG_RUNTIME_DIR");
    remove_env("LOCALAPPDATA");
}

/// Publish a metadata file for `pid` under `dir`'s `avd/running`,
/// the way a launching emulator would.
pub fn write_pid_file(dir: &Path, pid: u32, content: &str) -> PathBuf {
    let running = dir.join("avd").join("running");
    fs::create_dir_all(&running).expect("running directory should be creatable");

    let path = running.join(format!("pid_{pid}.ini"));
    fs::write(&path, content).expect("metadata file should be writable");
    path
}
