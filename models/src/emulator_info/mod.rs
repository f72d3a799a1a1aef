//! One discoverable emulator instance.

pub mod builder;

pub use builder::EmulatorInfoBuilder;

use common::RedactedToken;

use std::path::PathBuf;

/// Everything a running emulator publishes about itself in its
/// `pid_<pid>.ini` metadata file.
///
/// Records are immutable once built and discarded on the next scan.
#[derive(Debug, Clone)]
pub struct EmulatorInfo {
    /// Process id of the emulator, taken from the metadata file name.
    pub pid: u32,
    /// Port the gRPC endpoint listens on (loopback only).
    pub grpc_port: u16,
    /// Access token the endpoint expects on every call, if any.
    pub grpc_token: Option<RedactedToken>,
    /// Whether the endpoint speaks TLS. Absent means unknown.
    pub grpc_use_tls: Option<bool>,
    /// Console port (`port.serial`), the one that names the device.
    pub serial_port: Option<u16>,
    /// ADB port (`port.adb`).
    pub adb_port: Option<u16>,
    /// AVD name (informational).
    pub avd_name: Option<String>,
    /// AVD content directory (informational).
    pub avd_dir: Option<PathBuf>,
    /// AVD id (informational).
    pub avd_id: Option<String>,
    /// Command line the emulator was launched with (informational).
    pub cmdline: Option<String>,
}

impl EmulatorInfo {
    /// The adb-style device name, e.g. `emulator-5554`.
    ///
    /// Prefers the console port; emulators that publish only `port.adb`
    /// are named after that instead. `None` when neither port is known.
    pub fn name(&self) -> Option<String> {
        self.serial_port
            .or(self.adb_port)
            .map(|port| format!("emulator-{port}"))
    }

    /// Whether the record explicitly demands TLS.
    pub fn requires_tls(&self) -> bool {
        self.grpc_use_tls.unwrap_or(false)
    }

    /// Whether calls to this endpoint must carry a bearer token.
    pub fn requires_token(&self) -> bool {
        self.grpc_token.is_some()
    }
}
