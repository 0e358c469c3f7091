//! Message protocol for linkstash.
//!
//! Defines what crosses a context boundary: [`Request`]s sent from any
//! client context to the gateway, the single [`Reply`] each one receives,
//! and the fire-and-forget [`Broadcast`] events pushed to every context after
//! a mutation. Everything travels JSON-encoded through [`JsonCodec`].
//!
//! The [`transport`] module provides the channel a client uses to reach the
//! gateway. It pairs every send with exactly one reply slot, which is the
//! only request/response correlation the protocol relies on.

pub mod codec;
pub mod context;
pub mod error;
pub mod message;
pub mod transport;

pub use codec::JsonCodec;
pub use context::ContextId;
pub use error::{ProtocolError, ProtocolResult};
pub use message::{
    message_types, Broadcast, Reply, Request, MAX_MESSAGE_SIZE, UNKNOWN_MESSAGE_TYPE,
};
pub use transport::{
    channel, ChannelTransport, Endpoint, Envelope, Inbox, Transport, TransportError,
    TransportResult,
};
