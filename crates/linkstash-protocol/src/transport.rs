//! In-process request/response transport between client contexts and the
//! gateway.
//!
//! A client hands a payload to [`Transport::send`] and waits for exactly one
//! reply. The gateway side pulls [`Envelope`]s from an [`Inbox`] and answers
//! each through [`Envelope::respond`], which consumes the envelope so no
//! request can be answered twice.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::context::ContextId;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Nothing is listening on the other side.
    #[error("could not establish connection: receiving end does not exist")]
    Disconnected,

    /// The request was accepted but dropped without an answer.
    #[error("message channel closed before a response was received")]
    NoReply,
}

pub type TransportResult<T> = Result<T, TransportError>;

/// A request/response link to the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The context this transport sends from.
    fn origin(&self) -> ContextId;

    /// Deliver an encoded request and wait for its encoded reply.
    async fn send(&self, payload: Bytes) -> TransportResult<Bytes>;
}

/// One in-flight request together with its reply slot.
#[derive(Debug)]
pub struct Envelope {
    origin: ContextId,
    payload: Bytes,
    reply: oneshot::Sender<Bytes>,
}

impl Envelope {
    pub fn origin(&self) -> ContextId {
        self.origin
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Answer the request. Returns `false` if the sender stopped waiting.
    pub fn respond(self, reply: Bytes) -> bool {
        self.reply.send(reply).is_ok()
    }
}

/// Create a bounded request channel. The [`Endpoint`] hands out client
/// transports; the [`Inbox`] belongs to the gateway.
pub fn channel(capacity: usize) -> (Endpoint, Inbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Endpoint { tx }, Inbox { rx })
}

/// Factory for client-side transports.
#[derive(Clone, Debug)]
pub struct Endpoint {
    tx: mpsc::Sender<Envelope>,
}

impl Endpoint {
    pub fn connect(&self, origin: ContextId) -> ChannelTransport {
        ChannelTransport {
            origin,
            tx: self.tx.clone(),
        }
    }

    /// Whether the gateway side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Gateway-side receiving half.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::Receiver<Envelope>,
}

impl Inbox {
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Stop accepting requests. Envelopes already queued can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[derive(Clone, Debug)]
pub struct ChannelTransport {
    origin: ContextId,
    tx: mpsc::Sender<Envelope>,
}

#[async_trait]
impl Transport for ChannelTransport {
    fn origin(&self) -> ContextId {
        self.origin
    }

    async fn send(&self, payload: Bytes) -> TransportResult<Bytes> {
        let (reply, waiting) = oneshot::channel();
        let envelope = Envelope {
            origin: self.origin,
            payload,
            reply,
        };
        self.tx
            .send(envelope)
            .await
            .map_err(|_| TransportError::Disconnected)?;
        waiting.await.map_err(|_| TransportError::NoReply)
    }
}
