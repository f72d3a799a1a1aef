use emulator_core::credentials::{CredentialConfig, CredentialStore, SigningKeySet};
use emulator_core::error::CredentialError;

use std::fs;
use std::time::Duration;

// ============================================================================
// Public API tests for the credential store. Every test points the store
// at an explicit directory; nothing here reads the process environment.
// ============================================================================

/// **VALUE**: Verifies an empty android directory yields a store with no
/// TLS and no signing, rather than an error.
///
/// **WHY THIS MATTERS**: This is the state of every machine that has
/// never configured a secured emulator; plaintext discovery must keep
/// working there.
#[test]
fn given_empty_android_dir_when_loading_then_store_has_no_material() {
    // GIVEN: An empty directory
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());

    // WHEN: Loading
    let store = CredentialStore::load(&config).expect("load should succeed");

    // THEN: No TLS, no signing
    assert!(store.tls_credentials().is_none());
    assert!(store.signing_handle().is_none());
}

/// **VALUE**: Verifies a certificate on disk surfaces through
/// `tls_credentials` byte for byte.
#[test]
fn given_certificate_on_disk_when_loading_then_pem_bytes_surface() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    let pem = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
    fs::write(&config.tls_cert_path, pem).expect("certificate should be writable");

    let store = CredentialStore::load(&config).expect("load should succeed");

    assert_eq!(store.tls_credentials(), Some(&pem[..]));
}

/// **VALUE**: Verifies a bootstrapped key set turns into a signing
/// handle on the next load.
#[test]
fn given_bootstrapped_key_set_when_loading_then_signing_handle_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    SigningKeySet::bootstrap(&config.key_dir).expect("bootstrap should succeed");

    let store = CredentialStore::load(&config).expect("load should succeed");

    let minter = store.signing_handle().expect("signing handle present");
    assert_eq!(minter.issuer(), "PyModule");
}

/// **VALUE**: Verifies a corrupt key set fails the load outright.
///
/// **WHY THIS MATTERS**: Signed traffic is impossible with a corrupt key
/// set; pretending otherwise would surface as opaque UNAUTHENTICATED
/// errors on every call instead of one clear local failure.
#[test]
fn given_corrupt_key_set_when_loading_then_load_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    fs::create_dir_all(&config.key_dir).expect("key dir");
    fs::write(config.key_dir.join("k1.jwk"), "{ not json").expect("key file");
    fs::write(config.key_dir.join("active"), "k1").expect("active file");

    let result = CredentialStore::load(&config);

    assert!(matches!(result, Err(CredentialError::KeySetCorrupt { .. })));
}

/// **VALUE**: Verifies the token lifetime bound is enforced at
/// configuration time, for zero and for beyond-the-cap values.
#[test]
fn given_out_of_bounds_ttl_when_loading_then_returns_invalid_ttl() {
    let dir = tempfile::tempdir().expect("tempdir");

    let zero = CredentialConfig::with_android_dir(dir.path())
        .with_token_ttl(Duration::ZERO);
    let oversized = CredentialConfig::with_android_dir(dir.path())
        .with_token_ttl(Duration::from_secs(901));

    assert!(matches!(
        CredentialStore::load(&zero),
        Err(CredentialError::InvalidTtl { .. })
    ));
    assert!(matches!(
        CredentialStore::load(&oversized),
        Err(CredentialError::InvalidTtl { .. })
    ));
}

/// **VALUE**: Verifies the configured issuer flows through to the
/// signing handle.
#[test]
fn given_custom_issuer_when_loading_then_minter_uses_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path()).with_issuer("MyClient");
    SigningKeySet::bootstrap(&config.key_dir).expect("bootstrap should succeed");

    let store = CredentialStore::load(&config).expect("load should succeed");

    assert_eq!(
        store.signing_handle().expect("handle").issuer(),
        "MyClient"
    );
}
