//! Local credential material for emulator channels.
//!
//! Two artifacts live under the user's `.android` directory:
//! - `emulator-grpc.cer`: PEM certificate the emulator's self-signed TLS
//!   endpoint presents (`CN=localhost`)
//! - `grpc-keys/`: JWT signing key set, one `<kid>.jwk` record per key
//!   plus an `active` file naming the signing key
//!
//! The store is initialized at most once per process and is read-only
//! thereafter; concurrent readers need no locking.

pub mod keyset;
pub mod token;

pub use keyset::{SigningKeyRecord, SigningKeySet};
pub use token::TokenMinter;

use crate::discovery::paths::{self, EnvLookup, ProcessEnv};
use crate::error::CredentialError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use once_cell::sync::OnceCell;

pub const TLS_CERTIFICATE_FILE: &str = "emulator-grpc.cer";
pub const KEY_SET_DIR: &str = "grpc-keys";

/// Issuer claim the emulator accepts by default.
pub const DEFAULT_TOKEN_ISSUER: &str = "PyModule";

/// Upper bound on a minted token's lifetime.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Where credential material is looked up and how tokens are stamped.
#[derive(Debug, Clone)]
pub struct CredentialConfig {
    pub tls_cert_path: PathBuf,
    pub key_dir: PathBuf,
    pub issuer: String,
    pub token_ttl: Duration,
}

impl CredentialConfig {
    /// Conventional locations under the user's `.android` directory.
    pub fn new() -> Self {
        Self::with_android_dir(android_dir(&ProcessEnv))
    }

    pub fn with_android_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            tls_cert_path: dir.join(TLS_CERTIFICATE_FILE),
            key_dir: dir.join(KEY_SET_DIR),
            issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            token_ttl: MAX_TOKEN_TTL,
        }
    }

    /// The emulator's acceptance policy for `iss` is undocumented; the
    /// default matches what it is known to accept.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The user's `.android` directory: `$ANDROID_EMULATOR_HOME`, else
/// `$ANDROID_SDK_HOME/.android`, else `~/.android`.
fn android_dir(env: &dyn EnvLookup) -> PathBuf {
    paths::android_home(env).unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".android")
    })
}

static SHARED: OnceCell<CredentialStore> = OnceCell::new();

/// Process-wide credential material.
pub struct CredentialStore {
    tls: Option<Vec<u8>>,
    minter: Option<TokenMinter>,
}

impl CredentialStore {
    /// Load credential material per `config`.
    ///
    /// A missing or unreadable TLS certificate only disables TLS; a
    /// missing key directory only disables signing. A key directory that
    /// exists but cannot be understood is fatal.
    pub fn load(config: &CredentialConfig) -> Result<Self, CredentialError> {
        let ttl = config.token_ttl;
        if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
            return Err(CredentialError::invalid_ttl(ttl.as_secs()));
        }

        let tls = read_tls_certificate(&config.tls_cert_path);

        let minter = match SigningKeySet::load(&config.key_dir)? {
            Some(keys) => Some(TokenMinter::new(config.issuer.clone(), ttl, &keys)?),
            None => None,
        };

        Ok(Self { tls, minter })
    }

    /// The default-config store, initialized on first use and shared by
    /// every channel in the process.
    pub fn shared() -> Result<&'static CredentialStore, CredentialError> {
        SHARED.get_or_try_init(|| Self::load(&CredentialConfig::default()))
    }

    /// PEM bytes of the emulator's TLS certificate, when one is on disk.
    pub fn tls_credentials(&self) -> Option<&[u8]> {
        self.tls.as_deref()
    }

    /// A handle capable of signing call tokens, when a key set is on disk.
    pub fn signing_handle(&self) -> Option<&TokenMinter> {
        self.minter.as_ref()
    }
}

fn read_tls_certificate(path: &Path) -> Option<Vec<u8>> {
    if !path.exists() {
        debug!("No TLS certificate at {}", path.display());
        return None;
    }

    match fs::read(path) {
        Ok(bytes) => {
            info!("Using TLS certificate at {}", path.display());
            Some(bytes)
        }
        Err(e) => {
            // Logged, never raised: the caller may still reach an
            // emulator that speaks plaintext.
            warn!(
                "{}; continuing without TLS",
                CredentialError::tls_certificate_unreadable(path, e)
            );
            None
        }
    }
}
