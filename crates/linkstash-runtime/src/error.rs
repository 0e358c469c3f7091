use linkstash_client::{ClientError, HandshakeError};
use linkstash_store::StoreError;
use linkstash_types::LinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    #[error("invalid link: {0}")]
    Link(#[from] LinkError),

    #[error("gateway task failed: {0}")]
    Gateway(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
