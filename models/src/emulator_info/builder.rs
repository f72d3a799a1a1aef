use crate::EmulatorInfo;
use crate::error::model_error::ModelError;

use common::{ErrorLocation, RedactedToken};

use std::panic::Location;
use std::path::PathBuf;

/// Builder for creating validated EmulatorInfo instances.
///
/// Required fields are the process id and the gRPC port; everything else
/// defaults to absent, matching what a minimal metadata file publishes.
#[derive(Debug, Default)]
pub struct EmulatorInfoBuilder {
    pid: Option<u32>,
    grpc_port: Option<u16>,
    grpc_token: Option<RedactedToken>,
    grpc_use_tls: Option<bool>,
    serial_port: Option<u16>,
    adb_port: Option<u16>,
    avd_name: Option<String>,
    avd_dir: Option<PathBuf>,
    avd_id: Option<String>,
    cmdline: Option<String>,
}

impl EmulatorInfoBuilder {
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn with_grpc_port(mut self, port: u16) -> Self {
        self.grpc_port = Some(port);
        self
    }

    pub fn with_grpc_token(mut self, token: impl Into<RedactedToken>) -> Self {
        self.grpc_token = Some(token.into());
        self
    }

    pub fn with_grpc_use_tls(mut self, use_tls: bool) -> Self {
        self.grpc_use_tls = Some(use_tls);
        self
    }

    pub fn with_serial_port(mut self, port: u16) -> Self {
        self.serial_port = Some(port);
        self
    }

    pub fn with_adb_port(mut self, port: u16) -> Self {
        self.adb_port = Some(port);
        self
    }

    pub fn with_avd_name(mut self, name: impl Into<String>) -> Self {
        self.avd_name = Some(name.into());
        self
    }

    pub fn with_avd_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.avd_dir = Some(dir.into());
        self
    }

    pub fn with_avd_id(mut self, id: impl Into<String>) -> Self {
        self.avd_id = Some(id.into());
        self
    }

    pub fn with_cmdline(mut self, cmdline: impl Into<String>) -> Self {
        self.cmdline = Some(cmdline.into());
        self
    }

    /// Build the EmulatorInfo with validation.
    #[track_caller]
    pub fn build(self) -> Result<EmulatorInfo, ModelError> {
        let pid = self.pid.ok_or_else(|| ModelError::Validation {
            message: String::from("PID is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if pid == 0 {
            return Err(ModelError::Validation {
                message: String::from("PID must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let grpc_port = self.grpc_port.ok_or_else(|| ModelError::Validation {
            message: String::from("gRPC port is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if grpc_port == 0 {
            return Err(ModelError::Validation {
                message: String::from("gRPC port must be non-zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(EmulatorInfo {
            pid,
            grpc_port,
            grpc_token: self.grpc_token,
            grpc_use_tls: self.grpc_use_tls,
            serial_port: self.serial_port,
            adb_port: self.adb_port,
            avd_name: self.avd_name,
            avd_dir: self.avd_dir,
            avd_id: self.avd_id,
            cmdline: self.cmdline,
        })
    }
}
