use linkstash_protocol::{ProtocolError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The channel to the gateway failed; no reply was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The gateway replied with `success: false`.
    #[error("{0}")]
    Application(String),

    /// A reply arrived but could not be understood.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("gateway not ready after {attempts} attempts")]
    GaveUp { attempts: u32 },
}
