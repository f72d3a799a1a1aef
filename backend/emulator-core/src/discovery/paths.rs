//! Platform-aware resolution of emulator discovery directories.
//!
//! Lookup order per OS family (every candidate ends with `avd/running`):
//! 1. Linux: `$XDG_RUNTIME_DIR`, then `/run/user/<uid>`, then the
//!    `.android` home
//! 2. macOS: `$HOME/Library/Caches/TemporaryItems`, then the `.android`
//!    home candidates
//! 3. Windows: `%LOCALAPPDATA%\Temp`, then the `.android` home candidates
//!
//! The `.android` home is `$ANDROID_EMULATOR_HOME` when set, else
//! `$ANDROID_SDK_HOME/.android`. Only directories that exist contribute to
//! a scan; an empty result simply means no emulator can be discovered.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use log::{debug, trace};

/// Host OS family, as far as discovery is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            OsFamily::MacOs
        } else if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Linux
        }
    }
}

/// Environment lookup seam; keeps the resolution table pure and testable.
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment. Empty values count as unset.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.is_empty())
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty()).cloned()
    }
}

/// The user's `.android` directory as derivable from the environment alone.
pub(crate) fn android_home(env: &dyn EnvLookup) -> Option<PathBuf> {
    if let Some(home) = env.var("ANDROID_EMULATOR_HOME") {
        return Some(PathBuf::from(home));
    }
    env.var("ANDROID_SDK_HOME")
        .map(|sdk| PathBuf::from(sdk).join(".android"))
}

/// Ordered candidate directories for `(os, env, uid)`, unfiltered.
///
/// Pure in its inputs: the same environment always yields the same list.
pub fn candidate_directories(os: OsFamily, env: &dyn EnvLookup, uid: u32) -> Vec<PathBuf> {
    let mut bases: Vec<PathBuf> = Vec::new();

    match os {
        OsFamily::Linux => {
            if let Some(runtime) = env.var("XDG_RUNTIME_DIR") {
                bases.push(PathBuf::from(runtime));
            }
            bases.push(PathBuf::from(format!("/run/user/{uid}")));
            if let Some(android) = android_home(env) {
                bases.push(android);
            }
        }
        OsFamily::MacOs => {
            if let Some(home) = env.var("HOME") {
                bases.push(
                    PathBuf::from(home)
                        .join("Library")
                        .join("Caches")
                        .join("TemporaryItems"),
                );
            }
            if let Some(emulator_home) = env.var("ANDROID_EMULATOR_HOME") {
                bases.push(PathBuf::from(emulator_home));
            }
            if let Some(sdk) = env.var("ANDROID_SDK_HOME") {
                bases.push(PathBuf::from(sdk).join(".android"));
            }
        }
        OsFamily::Windows => {
            if let Some(local) = env.var("LOCALAPPDATA") {
                bases.push(PathBuf::from(local).join("Temp"));
            }
            if let Some(emulator_home) = env.var("ANDROID_EMULATOR_HOME") {
                bases.push(PathBuf::from(emulator_home));
            }
            if let Some(sdk) = env.var("ANDROID_SDK_HOME") {
                bases.push(PathBuf::from(sdk).join(".android"));
            }
        }
    }

    bases
        .into_iter()
        .map(|base| base.join("avd").join("running"))
        .collect()
}

/// The directories a scan should visit right now, in resolution order,
/// filtered to those that exist.
pub fn discovery_directories() -> Vec<PathBuf> {
    let candidates = candidate_directories(OsFamily::current(), &ProcessEnv, current_uid());

    let existing: Vec<PathBuf> = candidates
        .into_iter()
        .filter(|dir| {
            let exists = dir.is_dir();
            trace!("Discovery candidate {} (exists: {exists})", dir.display());
            exists
        })
        .collect();

    debug!("{} discovery directories on this host", existing.len());
    existing
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: getuid has no failure modes and touches no shared state.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}
