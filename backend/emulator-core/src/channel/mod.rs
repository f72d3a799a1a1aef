//! Channel construction for discovered emulators.
//!
//! Given a record and the credential store, the factory resolves the
//! transport security profile, builds a `tonic` endpoint on the loopback
//! interface, and wraps it with per-call bearer authorization when the
//! record or the store calls for it. Channels connect lazily on the first
//! RPC; nothing here opens a socket.

pub mod auth;

pub use auth::{BearerChannel, BearerSource};

use crate::credentials::CredentialStore;
use crate::error::ChannelError;
use crate::{EMULATOR_HOSTNAME, EMULATOR_PLAINTEXT_BASE, EMULATOR_TLS_BASE};

use models::EmulatorInfo;

use log::debug;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

/// A transport to one emulator, with bearer authorization when required.
pub type EmulatorChannel = BearerChannel<Channel>;

/// How to treat a record that demands TLS when no local certificate
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsPolicy {
    /// Fail the channel: the emulator's endpoint is self-signed, so
    /// without its certificate the handshake cannot be verified.
    #[default]
    RequireLocalCertificate,
    /// Trust the platform's root store instead.
    SystemRoots,
}

/// Transport security resolved for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportProfile {
    Plaintext,
    /// TLS with the local certificate as the sole trust root.
    TlsPinned(Vec<u8>),
    /// TLS against the system trust store.
    TlsSystemRoots,
}

/// Resolve the security profile for `record`: TLS whenever the record
/// demands it or a certificate is available, plaintext otherwise.
pub fn transport_profile(
    record: &EmulatorInfo,
    store: &CredentialStore,
    policy: TlsPolicy,
) -> Result<TransportProfile, ChannelError> {
    match (record.requires_tls(), store.tls_credentials()) {
        (_, Some(pem)) => Ok(TransportProfile::TlsPinned(pem.to_vec())),
        (true, None) => match policy {
            TlsPolicy::RequireLocalCertificate => Err(ChannelError::tls_certificate_required()),
            TlsPolicy::SystemRoots => Ok(TransportProfile::TlsSystemRoots),
        },
        (false, None) => Ok(TransportProfile::Plaintext),
    }
}

/// The bearer for calls through a record's channel: a signing handle
/// always wins; otherwise the record's own token rides verbatim;
/// otherwise calls go out unauthenticated.
pub fn bearer_source(record: &EmulatorInfo, store: &CredentialStore) -> Option<BearerSource> {
    if let Some(minter) = store.signing_handle() {
        return Some(BearerSource::Minted(minter.clone()));
    }
    record.grpc_token.clone().map(BearerSource::Static)
}

/// Builds channels for discovered emulator records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelFactory {
    policy: TlsPolicy,
}

impl ChannelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls_policy(policy: TlsPolicy) -> Self {
        Self { policy }
    }

    fn endpoint(
        &self,
        record: &EmulatorInfo,
        store: &CredentialStore,
    ) -> Result<Endpoint, ChannelError> {
        let profile = transport_profile(record, store, self.policy)?;

        let uri = match profile {
            TransportProfile::Plaintext => {
                format!("{EMULATOR_PLAINTEXT_BASE}:{}", record.grpc_port)
            }
            _ => format!("{EMULATOR_TLS_BASE}:{}", record.grpc_port),
        };
        debug!("Emulator pid {} endpoint: {uri}", record.pid);

        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ChannelError::invalid_endpoint(uri, e))?;

        match profile {
            TransportProfile::Plaintext => Ok(endpoint),
            TransportProfile::TlsPinned(pem) => {
                let tls = ClientTlsConfig::new()
                    .ca_certificate(Certificate::from_pem(pem))
                    .domain_name(EMULATOR_HOSTNAME);
                endpoint.tls_config(tls).map_err(ChannelError::tls)
            }
            TransportProfile::TlsSystemRoots => {
                let tls = ClientTlsConfig::new().with_native_roots();
                endpoint.tls_config(tls).map_err(ChannelError::tls)
            }
        }
    }

    /// Build a channel without touching the network; the connection is
    /// established on the first RPC. Safe to call from blocking contexts.
    pub fn channel(
        &self,
        record: &EmulatorInfo,
        store: &CredentialStore,
    ) -> Result<EmulatorChannel, ChannelError> {
        let endpoint = self.endpoint(record, store)?;
        Ok(BearerChannel::new(
            endpoint.connect_lazy(),
            bearer_source(record, store),
        ))
    }

    /// Build a channel and establish the connection before returning.
    pub async fn connect(
        &self,
        record: &EmulatorInfo,
        store: &CredentialStore,
    ) -> Result<EmulatorChannel, ChannelError> {
        let endpoint = self.endpoint(record, store)?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ChannelError::transport(format!("emulator pid {}", record.pid), e))?;
        Ok(BearerChannel::new(channel, bearer_source(record, store)))
    }
}
