use crate::error::CredentialError;

use common::ErrorLocation;

use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ChannelError {
    #[error("Invalid endpoint '{endpoint}' {location}")]
    InvalidEndpoint {
        endpoint: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Record demands TLS but no local certificate is available {location}")]
    TlsCertificateRequired { location: ErrorLocation },

    #[error("TLS configuration rejected {location}")]
    Tls {
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Transport failure: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ChannelError {
    #[track_caller]
    pub fn invalid_endpoint(
        endpoint: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        ChannelError::InvalidEndpoint {
            endpoint: endpoint.into(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }

    #[track_caller]
    pub fn tls_certificate_required() -> Self {
        ChannelError::TlsCertificateRequired {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn tls(source: impl StdError + Send + Sync + 'static) -> Self {
        ChannelError::Tls {
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        ChannelError::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(source),
        }
    }
}
