//! Error types for credential material.
//!
//! Key design decisions:
//! - An unreadable TLS certificate is never fatal: the caller may still
//!   reach an emulator that speaks plaintext.
//! - A corrupt signing key set is always fatal: signed traffic is
//!   impossible and silently downgrading would hide it.

use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CredentialError {
    #[error("TLS certificate at {path} is unreadable {location}")]
    TlsCertificateUnreadable {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Signing key set at {path} is unreadable {location}")]
    KeySetUnreadable {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Signing key set is corrupt: {reason} {location}")]
    KeySetCorrupt {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Token minting failed: {reason} {location}")]
    TokenMint {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Token lifetime of {seconds}s is outside (0, 900] {location}")]
    InvalidTtl {
        seconds: u64,
        location: ErrorLocation,
    },
}

impl CredentialError {
    #[track_caller]
    pub fn tls_certificate_unreadable(
        path: &Path,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        CredentialError::TlsCertificateUnreadable {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }

    #[track_caller]
    pub fn key_set_unreadable(path: &Path, source: impl StdError + Send + Sync + 'static) -> Self {
        CredentialError::KeySetUnreadable {
            path: path.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }

    #[track_caller]
    pub fn key_set_corrupt(reason: impl Into<String>) -> Self {
        CredentialError::KeySetCorrupt {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn token_mint(reason: impl Into<String>) -> Self {
        CredentialError::TokenMint {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_ttl(seconds: u64) -> Self {
        CredentialError::InvalidTtl {
            seconds,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
