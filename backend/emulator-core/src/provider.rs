//! The entry points the rest of a client program consumes.
//!
//! `default_emulator()` resolves the instance with the lowest pid;
//! `emulator_by_pid()` resolves exactly the requested instance and never
//! falls back to another one. Both hand out a [`DiscoveredEmulator`],
//! which builds its transport lazily and exposes one typed client per
//! emulator service. Every failure surfaces as a typed error; nothing
//! here exits the process.

use crate::channel::{ChannelFactory, EmulatorChannel, TlsPolicy};
use crate::credentials::CredentialStore;
use crate::discovery::EmulatorRegistry;
use crate::error::{CoreError, DiscoveryError};
use crate::proto::control::emulator_controller_client::EmulatorControllerClient;
use crate::proto::control::snapshot_service_client::SnapshotServiceClient;
use crate::proto::control::ui_controller_client::UiControllerClient;
use crate::proto::control::vhci_forwarding_client::VhciForwardingClient;

use models::EmulatorInfo;

use log::debug;
use once_cell::sync::OnceCell;

/// One discovered emulator, ready to hand out typed clients.
///
/// The transport is built through the channel factory on the first
/// accessor call and cached for the record's lifetime; typed clients are
/// cheap clones on top of it. Dropping this value drops the channel.
pub struct DiscoveredEmulator {
    info: EmulatorInfo,
    factory: ChannelFactory,
    channel: OnceCell<EmulatorChannel>,
}

impl DiscoveredEmulator {
    pub fn new(info: EmulatorInfo) -> Self {
        Self::with_tls_policy(info, TlsPolicy::default())
    }

    pub fn with_tls_policy(info: EmulatorInfo, policy: TlsPolicy) -> Self {
        Self {
            info,
            factory: ChannelFactory::with_tls_policy(policy),
            channel: OnceCell::new(),
        }
    }

    pub fn info(&self) -> &EmulatorInfo {
        &self.info
    }

    pub fn pid(&self) -> u32 {
        self.info.pid
    }

    /// The adb-style device name, e.g. `emulator-5554`.
    pub fn name(&self) -> Option<String> {
        self.info.name()
    }

    /// The cached transport, built on first use.
    pub fn channel(&self) -> Result<&EmulatorChannel, CoreError> {
        self.channel.get_or_try_init(|| {
            debug!("Building channel for emulator pid {}", self.info.pid);
            let store = CredentialStore::shared()?;
            Ok(self.factory.channel(&self.info, store)?)
        })
    }

    pub fn controller(&self) -> Result<EmulatorControllerClient<EmulatorChannel>, CoreError> {
        Ok(EmulatorControllerClient::new(self.channel()?.clone()))
    }

    pub fn snapshots(&self) -> Result<SnapshotServiceClient<EmulatorChannel>, CoreError> {
        Ok(SnapshotServiceClient::new(self.channel()?.clone()))
    }

    pub fn ui(&self) -> Result<UiControllerClient<EmulatorChannel>, CoreError> {
        Ok(UiControllerClient::new(self.channel()?.clone()))
    }

    pub fn vhci(&self) -> Result<VhciForwardingClient<EmulatorChannel>, CoreError> {
        Ok(VhciForwardingClient::new(self.channel()?.clone()))
    }
}

/// The default emulator: lowest pid currently publishing.
pub fn default_emulator() -> Result<DiscoveredEmulator, CoreError> {
    EmulatorRegistry::new()
        .default_emulator()
        .map(DiscoveredEmulator::new)
        .ok_or_else(|| DiscoveryError::no_emulator_found().into())
}

/// The emulator with exactly `pid`. An absent pid is an error, never
/// "pick any".
pub fn emulator_by_pid(pid: u32) -> Result<DiscoveredEmulator, CoreError> {
    EmulatorRegistry::new()
        .find_by_pid(pid)
        .map(DiscoveredEmulator::new)
        .ok_or_else(|| DiscoveryError::emulator_not_found(pid).into())
}

/// Every emulator currently publishing, ascending by pid.
pub fn list_emulators() -> Vec<DiscoveredEmulator> {
    EmulatorRegistry::new()
        .find_all()
        .into_iter()
        .map(DiscoveredEmulator::new)
        .collect()
}
