use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum DiscoveryError {
    #[error("No emulator discovered on this host {location}")]
    NoEmulatorFound { location: ErrorLocation },

    #[error("Emulator with pid {pid} is not live {location}")]
    EmulatorNotFound { pid: u32, location: ErrorLocation },

    #[error("Malformed metadata in {path}: {reason} {location}")]
    MalformedMetadata {
        path: PathBuf,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Network Query Error: {message} {location}")]
    NetworkQuery {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl DiscoveryError {
    #[track_caller]
    pub fn no_emulator_found() -> Self {
        DiscoveryError::NoEmulatorFound {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn emulator_not_found(pid: u32) -> Self {
        DiscoveryError::EmulatorNotFound {
            pid,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn malformed_metadata(path: &Path, reason: impl Into<String>) -> Self {
        DiscoveryError::MalformedMetadata {
            path: path.to_path_buf(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
