use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{message_types, Broadcast, Reply, Request, MAX_MESSAGE_SIZE};

/// JSON codec for everything that crosses a context boundary.
pub struct JsonCodec;

impl JsonCodec {
    pub fn encode_request(request: &Request) -> ProtocolResult<Bytes> {
        encode(request)
    }

    /// Decode a request, separating "not a type we handle" from "a type we
    /// handle with a broken payload".
    pub fn decode_request(data: &[u8]) -> ProtocolResult<Request> {
        check_size(data.len())?;
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        let kind = match value.get("type").and_then(Value::as_str) {
            Some(kind) if message_types::REQUESTS.contains(&kind) => kind.to_owned(),
            other => return Err(ProtocolError::UnknownMessageType(other.map(str::to_owned))),
        };
        serde_json::from_value(value).map_err(|e| ProtocolError::Malformed {
            kind,
            reason: e.to_string(),
        })
    }

    pub fn encode_reply(reply: &Reply) -> ProtocolResult<Bytes> {
        encode(reply)
    }

    pub fn decode_reply(data: &[u8]) -> ProtocolResult<Reply> {
        decode(data)
    }

    pub fn encode_broadcast(event: &Broadcast) -> ProtocolResult<Bytes> {
        encode(event)
    }

    pub fn decode_broadcast(data: &[u8]) -> ProtocolResult<Broadcast> {
        decode(data)
    }
}

fn check_size(size: usize) -> ProtocolResult<()> {
    if size > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size,
            max: MAX_MESSAGE_SIZE,
        });
    }
    Ok(())
}

fn encode<T: Serialize>(msg: &T) -> ProtocolResult<Bytes> {
    let payload =
        serde_json::to_vec(msg).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    check_size(payload.len())?;
    Ok(Bytes::from(payload))
}

fn decode<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    check_size(data.len())?;
    serde_json::from_slice(data).map_err(|e| ProtocolError::Deserialization(e.to_string()))
}
