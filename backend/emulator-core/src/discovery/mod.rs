//! Emulator discovery.
//!
//! A running emulator publishes a `pid_<pid>.ini` metadata file under a
//! well-known per-user directory. This module provides:
//! - Resolution of the candidate directories per host OS ([`paths`])
//! - Parsing of individual metadata files ([`metadata`])
//! - The registry of currently discoverable instances ([`registry`])
//! - Liveness probes for stale-file detection ([`process`])
//!
//! Discovery is strictly local to the user account running the client;
//! nothing here crosses a host boundary.

pub mod metadata;
pub mod paths;
pub mod process;
pub mod registry;

pub use registry::EmulatorRegistry;
