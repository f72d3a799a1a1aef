// Unit tests for the pure authorization step. The law: exactly one
// `authorization` entry is appended, everything else in the request is
// preserved.

use crate::channel::auth::{BEARER_PREFIX, BearerSource, authorized_request, normalize_method};
use crate::credentials::DEFAULT_TOKEN_ISSUER;
use crate::credentials::keyset::{ACTIVE_FILE, SigningKeySet};
use crate::credentials::token::{CallClaims, TokenMinter};

use common::RedactedToken;

use std::fs;
use std::time::Duration;

use http::Request;
use http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

fn request_with_headers() -> Request<()> {
    Request::builder()
        .uri("http://localhost:8554/foo.Bar/Baz")
        .header("grpc-timeout", "5S")
        .header("x-custom", "kept")
        .body(())
        .expect("request should build")
}

/// **VALUE**: Verifies the static bearer rides verbatim with the
/// documented prefix.
#[test]
fn given_static_source_when_authorizing_then_bearer_header_is_appended() {
    // GIVEN: A request and a record token
    let request = request_with_headers();
    let source = BearerSource::Static(RedactedToken::new("abcd"));

    // WHEN: Authorizing
    let authorized = authorized_request(request, &source).expect("authorization should succeed");

    // THEN: Exactly one authorization entry with the Bearer prefix
    let values: Vec<_> = authorized.headers().get_all(AUTHORIZATION).iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(
        values[0].to_str().expect("header is ascii"),
        format!("{BEARER_PREFIX}abcd")
    );
}

/// **VALUE**: Verifies every pre-existing header survives authorization
/// untouched.
///
/// **WHY THIS MATTERS**: The deadline rides in `grpc-timeout`; dropping
/// or rewriting it would silently change call semantics for every
/// authenticated RPC.
#[test]
fn given_existing_headers_when_authorizing_then_they_are_preserved() {
    let request = request_with_headers();
    let source = BearerSource::Static(RedactedToken::new("abcd"));

    let authorized = authorized_request(request, &source).expect("authorization should succeed");

    assert_eq!(
        authorized.headers().get("grpc-timeout").map(|v| v.as_bytes()),
        Some(&b"5S"[..])
    );
    assert_eq!(
        authorized.headers().get("x-custom").map(|v| v.as_bytes()),
        Some(&b"kept"[..])
    );
    assert_eq!(authorized.uri().path(), "/foo.Bar/Baz");
    assert_eq!(authorized.headers().len(), 3);
}

/// **VALUE**: Verifies a minted bearer is scoped to the request's own
/// method path.
#[test]
fn given_minted_source_when_authorizing_then_audience_is_the_request_path() {
    // GIVEN: A minter over a known secret
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("k1.jwk"),
        r#"{
  "kid": "k1",
  "alg": "HS256",
  "secret": "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=",
  "not_before": "2020-01-01T00:00:00Z",
  "not_after": null
}"#,
    )
    .expect("key file");
    fs::write(dir.path().join(ACTIVE_FILE), "k1").expect("active file");
    let keys = SigningKeySet::load(dir.path())
        .expect("load")
        .expect("key set present");
    let minter = TokenMinter::new(
        DEFAULT_TOKEN_ISSUER.to_string(),
        Duration::from_secs(900),
        &keys,
    )
    .expect("minter should build");

    // WHEN: Authorizing a request
    let authorized = authorized_request(request_with_headers(), &BearerSource::Minted(minter))
        .expect("authorization should succeed");

    // THEN: The JWT's audience is the request path
    let header = authorized
        .headers()
        .get(AUTHORIZATION)
        .expect("authorization header present")
        .to_str()
        .expect("header is ascii");
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .expect("header carries the Bearer prefix");

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["/foo.Bar/Baz"]);
    let claims = decode::<CallClaims>(
        token,
        &DecodingKey::from_secret(b"0123456789abcdef0123456789abcdef"),
        &validation,
    )
    .expect("token decodes")
    .claims;

    assert_eq!(claims.aud, vec!["/foo.Bar/Baz".to_string()]);
    assert_eq!(claims.iss, "PyModule");
}

/// **VALUE**: Verifies method identifiers presented as raw bytes are
/// normalized to text rather than rejected.
#[test]
fn given_raw_bytes_when_normalizing_method_then_text_comes_back() {
    assert_eq!(normalize_method(b"/foo.Bar/Baz"), "/foo.Bar/Baz");
    // Invalid UTF-8 decodes lossily instead of failing the call.
    assert_eq!(normalize_method(b"/foo\xff"), "/foo\u{fffd}");
}
