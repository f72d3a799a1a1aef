pub mod channel;
pub mod credentials;
pub mod discovery;

pub use channel::ChannelError;
pub use credentials::CredentialError;
pub use discovery::DiscoveryError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Discovery(#[from] discovery::DiscoveryError),

    #[error(transparent)]
    Credential(#[from] credentials::CredentialError),

    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Model(#[from] models::ModelError),
}
