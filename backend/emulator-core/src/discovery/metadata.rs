//! Parsing of per-process emulator metadata files.
//!
//! A metadata file is flat UTF-8 `key=value` text named `pid_<pid>.ini`.
//! The pid comes from the file name, never the content. `grpc.port` is the
//! only key a record cannot exist without; any other missing or malformed
//! field degrades to absent.

use crate::error::DiscoveryError;

use models::{EmulatorInfo, EmulatorInfoBuilder};

use std::fs;
use std::path::Path;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

static PID_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^pid_(\d+)\.ini$").expect("pid file pattern is valid"));

/// Extract the process id from a metadata file name, if the base name has
/// the `pid_<digits>.ini` shape.
pub fn pid_from_file_name(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let captures = PID_FILE_PATTERN.captures(name)?;
    captures.get(1)?.as_str().parse().ok()
}

fn parse_port(path: &Path, key: &str, value: &str) -> Option<u16> {
    match value.parse() {
        Ok(port) => Some(port),
        Err(_) => {
            trace!(
                "{}: {key}={value} is not a port number, treating as absent",
                path.display()
            );
            None
        }
    }
}

/// Parse one metadata file into a record.
pub fn parse_metadata_file(path: &Path) -> Result<EmulatorInfo, DiscoveryError> {
    let pid = pid_from_file_name(path).ok_or_else(|| {
        DiscoveryError::malformed_metadata(path, "file name is not pid_<digits>.ini")
    })?;

    let content = fs::read_to_string(path)
        .map_err(|e| DiscoveryError::malformed_metadata(path, format!("unreadable: {e}")))?;

    let mut builder = EmulatorInfoBuilder::default().with_pid(pid);
    let mut grpc_port: Option<u16> = None;

    for line in content.lines() {
        // Blank lines and lines without '=' carry nothing.
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "grpc.port" => grpc_port = parse_port(path, key, value),
            "grpc.token" => {
                if !value.is_empty() {
                    builder = builder.with_grpc_token(value);
                }
            }
            "grpc.use_tls" => match value {
                "1" => builder = builder.with_grpc_use_tls(true),
                "0" => builder = builder.with_grpc_use_tls(false),
                other => {
                    trace!(
                        "{}: grpc.use_tls={other} is not 0/1, treating as absent",
                        path.display()
                    );
                }
            },
            "port.serial" => {
                if let Some(port) = parse_port(path, key, value) {
                    builder = builder.with_serial_port(port);
                }
            }
            "port.adb" => {
                if let Some(port) = parse_port(path, key, value) {
                    builder = builder.with_adb_port(port);
                }
            }
            "avd.name" => builder = builder.with_avd_name(value),
            "avd.dir" => builder = builder.with_avd_dir(value),
            "avd.id" => builder = builder.with_avd_id(value),
            "cmdline" => builder = builder.with_cmdline(value),
            unknown => trace!("{}: ignoring unknown key {unknown}", path.display()),
        }
    }

    let Some(port) = grpc_port else {
        return Err(DiscoveryError::malformed_metadata(
            path,
            "grpc.port missing or not a port number",
        ));
    };

    builder
        .with_grpc_port(port)
        .build()
        .map_err(|e| DiscoveryError::malformed_metadata(path, e.to_string()))
}
