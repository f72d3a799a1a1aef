//! Liveness probes for discovered emulators.
//!
//! Metadata files outlive a crashed emulator: the file is removed on clean
//! shutdown only. These probes let callers separate stale records from
//! live instances before building a channel.

use crate::discovery::registry::EmulatorRegistry;
use crate::error::DiscoveryError;

use common::ErrorLocation;
use models::EmulatorInfo;

use std::panic::Location;
use std::thread::sleep;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, Process, ProcessesToUpdate, System};

#[track_caller]
fn query_tcp_sockets() -> Result<Vec<SocketInfo>, DiscoveryError> {
    get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    )
    .map_err(|e| DiscoveryError::NetworkQuery {
        message: format!("Failed to query network sockets: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}

pub(crate) fn with_process<F, R>(pid: u32, f: F) -> Option<R>
where
    F: FnOnce(&Process) -> R,
{
    let mut sys = System::new_all();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    sys.process(Pid::from_u32(pid)).map(f)
}

/// Whether the process that published a record is still running.
pub fn is_alive(pid: u32) -> bool {
    with_process(pid, |_| true).unwrap_or(false)
}

/// Whether something is listening on a record's gRPC port.
pub fn is_listening(port: u16) -> Result<bool, DiscoveryError> {
    let sockets = query_tcp_sockets()?;

    for s in sockets {
        if let ProtocolSocketInfo::Tcp(tcp) = s.protocol_socket_info
            && tcp.state == TcpState::Listen
            && tcp.local_port == port
        {
            trace!("Port {port} has a listener (pids: {:?})", s.associated_pids);
            return Ok(true);
        }
    }

    Ok(false)
}

/// A record whose process is gone and whose port has no listener is stale.
pub fn is_stale(info: &EmulatorInfo) -> bool {
    if is_alive(info.pid) {
        return false;
    }
    !is_listening(info.grpc_port).unwrap_or(false)
}

/// Block until discovery yields at least one record, or the deadline
/// passes. Polls with exponential backoff; an emulator takes a few seconds
/// to publish its metadata file after launch.
pub fn wait_for_emulator(max_elapsed: Duration) -> Option<EmulatorInfo> {
    let registry = EmulatorRegistry::new();

    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    loop {
        if let Some(info) = registry.default_emulator() {
            debug!("Emulator pid {} appeared", info.pid);
            return Some(info);
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("No emulator yet, retrying after {duration:?}");
                sleep(duration);
            }
            None => {
                debug!("No emulator appeared within {max_elapsed:?}");
                return None;
            }
        }
    }
}
