//! Secret token handling with redacted Debug output.
//!
//! Emulator access tokens and signing secrets pass through discovery records
//! and credential files; this wrapper keeps them out of logs and serialized
//! state.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// A bearer token or signing secret that never exposes its value in logs
/// or debug output.
#[derive(Clone)]
pub struct RedactedToken {
    inner: String,
}

impl RedactedToken {
    /// Wrap a secret value.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: token.into(),
        }
    }

    /// Get the actual value for transmission.
    ///
    /// # Security Note
    /// Only call this when placing the value on the wire.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Get the token length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the token is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for RedactedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedactedToken([REDACTED])")
    }
}

impl fmt::Display for RedactedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED TOKEN]")
    }
}

impl Drop for RedactedToken {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl From<String> for RedactedToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl From<&str> for RedactedToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

// Prevent accidental serialization
impl serde::Serialize for RedactedToken {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::Serialization {
            message: String::from(
                "RedactedToken cannot be serialized - use as_str() explicitly",
            ),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
