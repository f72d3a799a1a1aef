// Unit tests for token minting. The laws: aud is exactly the invoked
// method, iss is the configured issuer, lifetime is positive and at most
// fifteen minutes.

use crate::credentials::keyset::{ACTIVE_FILE, SigningKeySet};
use crate::credentials::token::{CallClaims, TokenMinter};
use crate::credentials::DEFAULT_TOKEN_ISSUER;

use std::fs;
use std::path::Path;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

// SECRET, base64-encoded, as it sits in the key file.
const SECRET_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

fn seeded_key_set(dir: &Path) -> SigningKeySet {
    fs::write(
        dir.join("k1.jwk"),
        format!(
            r#"{{
  "kid": "k1",
  "alg": "HS256",
  "secret": "{SECRET_B64}",
  "not_before": "2020-01-01T00:00:00Z",
  "not_after": null
}}"#
        ),
    )
    .expect("key file should be writable");
    fs::write(dir.join(ACTIVE_FILE), "k1").expect("active file should be writable");

    SigningKeySet::load(dir)
        .expect("load should succeed")
        .expect("key set should be present")
}

fn decode_claims(token: &str, method: &str) -> CallClaims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[method]);

    decode::<CallClaims>(token, &DecodingKey::from_secret(SECRET), &validation)
        .expect("token should decode with the active key's secret")
        .claims
}

/// **VALUE**: Verifies a minted token decodes with the active key and
/// carries the method as its single audience.
///
/// **WHY THIS MATTERS**: The emulator matches `aud` against the method
/// it is serving; any drift here turns every authenticated call into
/// UNAUTHENTICATED.
#[test]
fn given_minter_when_minting_then_audience_is_exactly_the_method() {
    // GIVEN: A minter over a known key set
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = seeded_key_set(dir.path());
    let minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");

    // WHEN: Minting for one method
    let token = minter.mint("/foo.Bar/Baz").expect("mint should succeed");

    // THEN: aud is exactly that method
    let claims = decode_claims(&token, "/foo.Bar/Baz");
    assert_eq!(claims.aud, vec!["/foo.Bar/Baz".to_string()]);
}

/// **VALUE**: Verifies the issuer claim defaults to the wire-compatible
/// value and follows configuration.
#[test]
fn given_configured_issuer_when_minting_then_iss_matches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = seeded_key_set(dir.path());

    let default_minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");
    let custom_minter =
        TokenMinter::new("MyClient".to_string(), Duration::from_secs(900), &keys)
            .expect("minter should build");

    let default_claims = decode_claims(
        &default_minter.mint("/foo.Bar/Baz").expect("mint"),
        "/foo.Bar/Baz",
    );
    let custom_claims = decode_claims(
        &custom_minter.mint("/foo.Bar/Baz").expect("mint"),
        "/foo.Bar/Baz",
    );

    assert_eq!(default_claims.iss, "PyModule");
    assert_eq!(custom_claims.iss, "MyClient");
}

/// **VALUE**: Verifies the token lifetime law: `0 < exp - iat <= 900`.
#[test]
fn given_minted_token_when_inspecting_lifetime_then_it_is_bounded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = seeded_key_set(dir.path());
    let minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");

    let claims = decode_claims(
        &minter.mint("/foo.Bar/Baz").expect("mint"),
        "/foo.Bar/Baz",
    );

    let lifetime = claims.exp - claims.iat;
    assert!(lifetime > 0, "lifetime must be positive");
    assert!(lifetime <= 900, "lifetime must be at most 15 minutes");
}

/// **VALUE**: Verifies the header names the signing key so the peer can
/// pick the right verification key after a rotation.
#[test]
fn given_minted_token_when_inspecting_header_then_kid_names_active_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = seeded_key_set(dir.path());
    let minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");

    let token = minter.mint("/foo.Bar/Baz").expect("mint");
    let header = decode_header(&token).expect("header should decode");

    assert_eq!(header.kid.as_deref(), Some("k1"));
    assert_eq!(header.alg, Algorithm::HS256);
}

/// **VALUE**: Verifies each mint is independent: two calls to different
/// methods produce tokens scoped to their own method only.
#[test]
fn given_two_mints_when_decoding_then_each_is_scoped_to_its_own_method() {
    let dir = tempfile::tempdir().expect("tempdir");
    let keys = seeded_key_set(dir.path());
    let minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");

    let status = minter
        .mint("/android.emulation.control.EmulatorController/getStatus")
        .expect("mint");
    let save = minter
        .mint("/android.emulation.control.SnapshotService/SaveSnapshot")
        .expect("mint");

    assert_ne!(status, save);
    let claims = decode_claims(
        &status,
        "/android.emulation.control.EmulatorController/getStatus",
    );
    assert_eq!(
        claims.aud,
        vec!["/android.emulation.control.EmulatorController/getStatus".to_string()]
    );
}
