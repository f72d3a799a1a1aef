//! Per-call bearer authorization.
//!
//! One middleware serves every construction mode. The pure step,
//! [`authorized_request`], computes the new request: the method identifier
//! is normalized to text, the bearer is obtained, and the request is
//! rebuilt with exactly one `authorization` entry appended and everything
//! else (method, timeout, metadata, credentials, ready-on-wait) preserved.
//! The only suspension point sits between that step and forwarding to the
//! inner service; a failure to obtain the bearer fails the call
//! immediately, without retry.

use crate::credentials::TokenMinter;
use crate::error::CredentialError;

use common::RedactedToken;

use std::borrow::Cow;
use std::task::{Context, Poll};

use futures_util::future::{self, BoxFuture};
use http::header::AUTHORIZATION;
use http::{HeaderValue, Request};
use log::trace;
use tower::Service;

pub const BEARER_PREFIX: &str = "Bearer ";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where the bearer for a call comes from.
#[derive(Clone)]
pub enum BearerSource {
    /// A per-call JWT scoped to the invoked method.
    Minted(TokenMinter),
    /// The record's access token, attached verbatim.
    Static(RedactedToken),
}

impl BearerSource {
    fn bearer_for(&self, method: &str) -> Result<String, CredentialError> {
        match self {
            BearerSource::Minted(minter) => minter.mint(method),
            BearerSource::Static(token) => Ok(token.as_str().to_string()),
        }
    }
}

/// Method identifiers arrive as URI path bytes; decode them lossily so a
/// non-UTF-8 identifier still produces a usable audience.
pub(crate) fn normalize_method(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(raw)
}

/// Compute the authorized request. Constructs a new value from the parts
/// of the old one rather than mutating in place; only the header map
/// changes, by exactly one appended `authorization` entry.
pub fn authorized_request<B>(
    request: Request<B>,
    source: &BearerSource,
) -> Result<Request<B>, CredentialError> {
    let method = normalize_method(request.uri().path().as_bytes()).into_owned();
    let bearer = source.bearer_for(&method)?;

    let value = HeaderValue::try_from(format!("{BEARER_PREFIX}{bearer}")).map_err(|e| {
        CredentialError::token_mint(format!("bearer is not a valid header value: {e}"))
    })?;

    let (mut parts, body) = request.into_parts();
    parts.headers.append(AUTHORIZATION, value);
    trace!("Attached bearer for {method}");

    Ok(Request::from_parts(parts, body))
}

/// A transport wrapped with per-call bearer authorization.
///
/// With no source configured the service is a transparent passthrough, so
/// plaintext and authenticated channels share one type.
#[derive(Clone)]
pub struct BearerChannel<S> {
    inner: S,
    source: Option<BearerSource>,
}

impl<S> BearerChannel<S> {
    pub fn new(inner: S, source: Option<BearerSource>) -> Self {
        Self { inner, source }
    }

    /// Whether calls through this channel carry an `authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.source.is_some()
    }
}

impl<S, B> Service<Request<B>> for BearerChannel<S>
where
    S: Service<Request<B>>,
    S::Response: Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<S::Response, BoxError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let request = match &self.source {
            Some(source) => match authorized_request(request, source) {
                Ok(request) => request,
                Err(e) => return Box::pin(future::ready(Err(e.into()))),
            },
            None => request,
        };

        let fut = self.inner.call(request);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}
