//! Per-call bearer token minting.

use crate::credentials::keyset::{SIGNING_ALGORITHM, SigningKeySet};
use crate::error::CredentialError;

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::trace;
use serde::{Deserialize, Serialize};

/// Claims carried by every outbound call's bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallClaims {
    pub iss: String,
    /// Single element: the fully-qualified method path of this call.
    pub aud: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Signs one short-lived token per outbound call, scoped to the method
/// being invoked. Tokens are never cached or persisted.
#[derive(Clone)]
pub struct TokenMinter {
    issuer: String,
    ttl: Duration,
    kid: String,
    key: EncodingKey,
}

impl TokenMinter {
    pub fn new(
        issuer: String,
        ttl: Duration,
        keys: &SigningKeySet,
    ) -> Result<Self, CredentialError> {
        let active = keys.active_key()?;
        if active.alg != SIGNING_ALGORITHM {
            return Err(CredentialError::key_set_corrupt(format!(
                "key {}: unsupported signing algorithm '{}'",
                active.kid, active.alg
            )));
        }

        Ok(Self {
            issuer,
            ttl,
            kid: active.kid.clone(),
            key: EncodingKey::from_secret(&active.secret_bytes()?),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Mint a token for one call to `method`, e.g.
    /// `/android.emulation.control.EmulatorController/getStatus`.
    ///
    /// `iat` values across concurrent mints are non-decreasing at second
    /// granularity but not strictly monotonic; callers must not use them
    /// to order calls.
    pub fn mint(&self, method: &str) -> Result<String, CredentialError> {
        let iat = Utc::now().timestamp();
        let exp = iat + self.ttl.as_secs() as i64;

        let claims = CallClaims {
            iss: self.issuer.clone(),
            aud: vec![method.to_string()],
            iat,
            exp,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.kid.clone());

        let token = jsonwebtoken::encode(&header, &claims, &self.key)
            .map_err(|e| CredentialError::token_mint(e.to_string()))?;

        trace!("Minted bearer for {method} (lifetime {}s)", self.ttl.as_secs());
        Ok(token)
    }
}
