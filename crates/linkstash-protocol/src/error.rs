use thiserror::Error;

/// Malformed or unrecognized traffic.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The `type` tag is missing, not a string, or not one we handle.
    #[error("Unknown message type")]
    UnknownMessageType(Option<String>),

    /// A known message type whose payload does not decode.
    #[error("malformed {kind} message: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
