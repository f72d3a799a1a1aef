//! On-disk JWT signing key sets.
//!
//! A key directory holds one JSON record per key (`<kid>.jwk`) and an
//! `active` file naming the key used for signing. Keys outside their
//! activation window stay on disk so the peer can keep verifying tokens
//! minted before a rotation.

use crate::error::CredentialError;

use std::fmt;
use std::fs;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ACTIVE_FILE: &str = "active";
pub const KEY_FILE_EXTENSION: &str = "jwk";
pub const SIGNING_ALGORITHM: &str = "HS256";

const SECRET_LEN: usize = 32;

/// One signing key as stored on disk.
#[derive(Clone, Serialize, Deserialize)]
pub struct SigningKeyRecord {
    pub kid: String,
    pub alg: String,
    secret: String,
    pub not_before: DateTime<Utc>,
    pub not_after: Option<DateTime<Utc>>,
}

impl SigningKeyRecord {
    /// Whether this key may sign at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.not_before && self.not_after.is_none_or(|end| now < end)
    }

    pub(crate) fn secret_bytes(&self) -> Result<Vec<u8>, CredentialError> {
        STANDARD.decode(&self.secret).map_err(|e| {
            CredentialError::key_set_corrupt(format!("key {}: secret is not base64: {e}", self.kid))
        })
    }
}

impl fmt::Debug for SigningKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyRecord")
            .field("kid", &self.kid)
            .field("alg", &self.alg)
            .field("secret", &"[REDACTED]")
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish()
    }
}

/// The full key set read from a key directory. Read-only once loaded;
/// rotation happens out of band.
#[derive(Debug, Clone)]
pub struct SigningKeySet {
    keys: Vec<SigningKeyRecord>,
    active_kid: String,
}

impl SigningKeySet {
    /// Load the key set under `dir`.
    ///
    /// An absent directory is not an error (`Ok(None)`: unsigned traffic
    /// is fine). A directory that exists but cannot be understood is.
    pub fn load(dir: &Path) -> Result<Option<Self>, CredentialError> {
        if !dir.is_dir() {
            debug!("No signing key set at {}", dir.display());
            return Ok(None);
        }

        let active_path = dir.join(ACTIVE_FILE);
        let active_kid = fs::read_to_string(&active_path)
            .map_err(|e| CredentialError::key_set_unreadable(&active_path, e))?
            .trim()
            .to_string();
        if active_kid.is_empty() {
            return Err(CredentialError::key_set_corrupt("active file names no key"));
        }

        let mut keys = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| CredentialError::key_set_unreadable(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| CredentialError::key_set_unreadable(dir, e))?;
            let path = entry.path();
            let is_key_file = path
                .extension()
                .map(|ext| ext == KEY_FILE_EXTENSION)
                .unwrap_or(false);
            if !is_key_file {
                continue;
            }

            let content = fs::read_to_string(&path)
                .map_err(|e| CredentialError::key_set_unreadable(&path, e))?;
            let record: SigningKeyRecord = serde_json::from_str(&content)
                .map_err(|e| CredentialError::key_set_corrupt(format!("{}: {e}", path.display())))?;
            keys.push(record);
        }

        if keys.is_empty() {
            return Err(CredentialError::key_set_corrupt(
                "key directory contains no key files",
            ));
        }

        let set = Self { keys, active_kid };
        set.active_key()?;
        debug!(
            "Loaded signing key set from {} ({} key(s))",
            dir.display(),
            set.keys.len()
        );
        Ok(Some(set))
    }

    /// The key tokens are signed with right now.
    pub fn active_key(&self) -> Result<&SigningKeyRecord, CredentialError> {
        let now = Utc::now();

        let key = self
            .keys
            .iter()
            .find(|key| key.kid == self.active_kid)
            .ok_or_else(|| {
                CredentialError::key_set_corrupt(format!(
                    "active file names unknown key '{}'",
                    self.active_kid
                ))
            })?;

        if !key.is_active_at(now) {
            return Err(CredentialError::key_set_corrupt(format!(
                "active key '{}' is outside its activation window",
                key.kid
            )));
        }

        Ok(key)
    }

    /// Every key on disk, the historical ones included. The peer needs
    /// these to verify tokens minted before a rotation.
    pub fn verification_keys(&self) -> &[SigningKeyRecord] {
        &self.keys
    }

    /// Create a fresh key set under `dir`: one HS256 key, active
    /// immediately, no expiry. Never invoked implicitly; discovering an
    /// unsecured emulator must not grow credentials as a side effect.
    pub fn bootstrap(dir: &Path) -> Result<Self, CredentialError> {
        fs::create_dir_all(dir).map_err(|e| CredentialError::key_set_unreadable(dir, e))?;

        let mut secret = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut secret);

        let record = SigningKeyRecord {
            kid: Uuid::new_v4().to_string(),
            alg: SIGNING_ALGORITHM.to_string(),
            secret: STANDARD.encode(secret),
            not_before: Utc::now(),
            not_after: None,
        };

        let key_path = dir.join(format!("{}.{KEY_FILE_EXTENSION}", record.kid));
        let payload = serde_json::to_string_pretty(&record)
            .map_err(|e| CredentialError::key_set_corrupt(e.to_string()))?;
        fs::write(&key_path, payload)
            .map_err(|e| CredentialError::key_set_unreadable(&key_path, e))?;

        let active_path = dir.join(ACTIVE_FILE);
        fs::write(&active_path, &record.kid)
            .map_err(|e| CredentialError::key_set_unreadable(&active_path, e))?;

        info!("Bootstrapped signing key set at {}", dir.display());

        let active_kid = record.kid.clone();
        Ok(Self {
            keys: vec![record],
            active_kid,
        })
    }
}
