use thiserror::Error;

/// Errors produced while building or decoding link types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("timestamp {0} is outside the representable range")]
    TimestampOutOfRange(i64),

    #[error("invalid link id: {0:?}")]
    InvalidId(String),
}
