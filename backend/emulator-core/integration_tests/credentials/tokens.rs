use emulator_core::credentials::token::CallClaims;
use emulator_core::credentials::{CredentialConfig, CredentialStore, SigningKeySet};

use std::fs;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

#[derive(Deserialize)]
struct StoredKey {
    secret: String,
}

/// Read back the secret the bootstrap wrote, the way the emulator-side
/// verifier would.
fn stored_secret(config: &CredentialConfig) -> Vec<u8> {
    let kid = fs::read_to_string(config.key_dir.join("active")).expect("active file readable");
    let raw = fs::read_to_string(config.key_dir.join(format!("{}.jwk", kid.trim())))
        .expect("key file readable");
    let key: StoredKey = serde_json::from_str(&raw).expect("key file parses");
    STANDARD.decode(key.secret).expect("secret is base64")
}

/// **VALUE**: Verifies the full token-protected flow: bootstrap a key
/// set, load the store, mint for a method, and decode what a peer
/// holding the same key would see.
///
/// **WHY THIS MATTERS**: This is the token-protected end-to-end path; if
/// any link drifts (claims shape, algorithm, encoding), every call to a
/// secured emulator fails.
#[test]
fn given_key_set_on_disk_when_minting_then_peer_can_decode_scoped_claims() {
    // GIVEN: A bootstrapped key set and a loaded store
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    SigningKeySet::bootstrap(&config.key_dir).expect("bootstrap should succeed");
    let store = CredentialStore::load(&config).expect("load should succeed");

    // WHEN: Minting for one method
    let token = store
        .signing_handle()
        .expect("signing handle present")
        .mint("/foo.Bar/Baz")
        .expect("mint should succeed");

    // THEN: The peer-side decode sees the scoped claims
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["/foo.Bar/Baz"]);
    let claims = decode::<CallClaims>(
        &token,
        &DecodingKey::from_secret(&stored_secret(&config)),
        &validation,
    )
    .expect("token decodes with the stored secret")
    .claims;

    assert_eq!(claims.iss, "PyModule");
    assert_eq!(claims.aud, vec!["/foo.Bar/Baz".to_string()]);
    let lifetime = claims.exp - claims.iat;
    assert!(lifetime > 0 && lifetime <= 900);
}

/// **VALUE**: Verifies tokens are minted per call, never reused: two
/// mints for the same method still differ once their payloads differ by
/// issue time, and always decode independently.
#[test]
fn given_sequential_mints_when_decoding_then_each_token_stands_alone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CredentialConfig::with_android_dir(dir.path());
    SigningKeySet::bootstrap(&config.key_dir).expect("bootstrap should succeed");
    let store = CredentialStore::load(&config).expect("load should succeed");
    let minter = store.signing_handle().expect("signing handle present");

    let first = minter.mint("/foo.Bar/Baz").expect("mint");
    let second = minter.mint("/foo.Bar/Baz").expect("mint");

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["/foo.Bar/Baz"]);
    let key = DecodingKey::from_secret(&stored_secret(&config));

    let first_claims = decode::<CallClaims>(&first, &key, &validation)
        .expect("first decodes")
        .claims;
    let second_claims = decode::<CallClaims>(&second, &key, &validation)
        .expect("second decodes")
        .claims;

    // iat is non-decreasing at second granularity, nothing stronger.
    assert!(second_claims.iat >= first_claims.iat);
}
