use emulator_core::channel::{ChannelFactory, TlsPolicy, transport_profile};
use emulator_core::credentials::{CredentialConfig, CredentialStore, SigningKeySet};
use emulator_core::error::ChannelError;

use models::EmulatorInfoBuilder;

use std::fs;

// ============================================================================
// Public API tests for channel construction. Channels connect lazily, so
// none of these touch the network; a record pointing at a dead port still
// yields a perfectly good channel object.
// ============================================================================

fn empty_store() -> CredentialStore {
    let dir = tempfile::tempdir().expect("tempdir");
    CredentialStore::load(&CredentialConfig::with_android_dir(dir.path()))
        .expect("empty store loads")
}

/// **VALUE**: Verifies the plaintext path: no credential material, no
/// token on the record, therefore an unauthenticated channel.
///
/// **WHY THIS MATTERS**: Attaching an `authorization` header to an
/// emulator that never asked for one is how calls start failing with
/// UNIMPLEMENTED metadata errors on older builds.
#[tokio::test]
async fn given_plain_record_and_empty_store_when_building_then_channel_is_unauthenticated() {
    // GIVEN: A plain record and an empty store
    let record = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(8554)
        .build()
        .expect("record builds");
    let store = empty_store();

    // WHEN: Building lazily
    let channel = ChannelFactory::new()
        .channel(&record, &store)
        .expect("channel builds");

    // THEN: No bearer rides on it
    assert!(!channel.is_authenticated());
}

/// **VALUE**: Verifies a record token alone is enough to authenticate
/// the channel, with no key set anywhere on disk.
#[tokio::test]
async fn given_record_token_and_empty_store_when_building_then_channel_is_authenticated() {
    let record = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(8554)
        .with_grpc_token("abcd")
        .build()
        .expect("record builds");
    let store = empty_store();

    let channel = ChannelFactory::new()
        .channel(&record, &store)
        .expect("channel builds");

    assert!(channel.is_authenticated());
}

/// **VALUE**: Verifies a signing key set authenticates the channel even
/// when the record itself carries no token.
#[tokio::test]
async fn given_signing_key_set_when_building_then_channel_is_authenticated() {
    let record = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(8554)
        .build()
        .expect("record builds");

    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    SigningKeySet::bootstrap(&config.key_dir).expect("bootstrap succeeds");
    let store = CredentialStore::load(&config).expect("store loads");

    let channel = ChannelFactory::new()
        .channel(&record, &store)
        .expect("channel builds");

    assert!(channel.is_authenticated());
}

/// **VALUE**: Verifies the default TLS policy refuses to build a channel
/// to a TLS-demanding record without the local certificate.
///
/// **WHY THIS MATTERS**: The emulator's endpoint is self-signed; a
/// channel built against system roots would fail the handshake at the
/// first RPC with a far less actionable error.
#[test]
fn given_tls_demanded_without_certificate_when_building_then_returns_error() {
    // GIVEN: A record demanding TLS and a store with no certificate
    let record = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(8554)
        .with_grpc_use_tls(true)
        .build()
        .expect("record builds");
    let store = empty_store();

    // WHEN: Building under the default policy
    let result = ChannelFactory::new().channel(&record, &store);

    // THEN: A distinct, local error
    assert!(matches!(
        result,
        Err(ChannelError::TlsCertificateRequired { .. })
    ));
}

/// **VALUE**: Verifies the transport decision table directly: the
/// certificate wins whenever present, the policy knob only matters when
/// TLS is demanded without one.
#[test]
fn given_decision_table_inputs_when_resolving_profile_then_branches_match() {
    use emulator_core::channel::TransportProfile;

    let plain = EmulatorInfoBuilder::default()
        .with_pid(1)
        .with_grpc_port(8554)
        .build()
        .expect("record builds");
    let tls_demanding = EmulatorInfoBuilder::default()
        .with_pid(2)
        .with_grpc_port(8554)
        .with_grpc_use_tls(true)
        .build()
        .expect("record builds");

    let no_material = empty_store();

    let cert_dir = tempfile::tempdir().expect("tempdir");
    let cert_config = CredentialConfig::with_android_dir(cert_dir.path());
    let pem = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
    fs::write(&cert_config.tls_cert_path, pem).expect("certificate writable");
    let with_cert = CredentialStore::load(&cert_config).expect("store loads");

    // Certificate present: pinned TLS, demanded or not.
    assert!(matches!(
        transport_profile(&plain, &with_cert, TlsPolicy::RequireLocalCertificate),
        Ok(TransportProfile::TlsPinned(_))
    ));
    assert!(matches!(
        transport_profile(&tls_demanding, &with_cert, TlsPolicy::RequireLocalCertificate),
        Ok(TransportProfile::TlsPinned(_))
    ));

    // No certificate: plaintext unless demanded; the policy knob decides
    // the demanded case.
    assert!(matches!(
        transport_profile(&plain, &no_material, TlsPolicy::RequireLocalCertificate),
        Ok(TransportProfile::Plaintext)
    ));
    assert!(matches!(
        transport_profile(&tls_demanding, &no_material, TlsPolicy::RequireLocalCertificate),
        Err(ChannelError::TlsCertificateRequired { .. })
    ));
    assert!(matches!(
        transport_profile(&tls_demanding, &no_material, TlsPolicy::SystemRoots),
        Ok(TransportProfile::TlsSystemRoots)
    ));
}

/// **VALUE**: Verifies eager connection to a dead port surfaces as a
/// transport error instead of hanging or panicking.
#[tokio::test]
async fn given_dead_port_when_connecting_eagerly_then_returns_transport_error() {
    // GIVEN: A record pointing at a port with no listener
    let record = EmulatorInfoBuilder::default()
        .with_pid(1234)
        .with_grpc_port(1)
        .build()
        .expect("record builds");
    let store = empty_store();

    // WHEN: Connecting eagerly
    let result = ChannelFactory::new().connect(&record, &store).await;

    // THEN: A typed transport error
    assert!(matches!(result, Err(ChannelError::Transport { .. })));
}
