use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use linkstash_protocol::{
    Broadcast, Envelope, Inbox, JsonCodec, ProtocolError, Reply, Request,
};
use linkstash_store::LinkStore;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::fanout::Broadcaster;

/// Error text used when a failure has nothing better to say.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Turns requests into store calls and replies, and announces mutations.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<LinkStore>,
    broadcaster: Broadcaster,
}

impl Gateway {
    pub fn new(store: Arc<LinkStore>, broadcaster: Broadcaster) -> Self {
        Self { store, broadcaster }
    }

    pub fn store(&self) -> &Arc<LinkStore> {
        &self.store
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Dispatch one decoded request. Never fails: store errors become
    /// failure replies.
    pub async fn handle(&self, request: Request) -> Reply {
        let kind = request.type_name();
        match request {
            Request::Ping => Reply::pong(self.store.is_ready()),
            Request::SaveLink { link } => match self.store.append(link).await {
                Ok(record) => {
                    debug!(id = %record.id(), target = record.target_url(), "link saved");
                    self.broadcaster.publish(&Broadcast::LinkAdded {
                        url: record.target_url().to_owned(),
                    });
                    Reply::ok()
                }
                Err(e) => failure(kind, &e),
            },
            Request::GetAllLinks => match self.store.list_all().await {
                Ok(links) => {
                    debug!(count = links.len(), "links listed");
                    Reply::links(links)
                }
                Err(e) => failure(kind, &e),
            },
            Request::ClearAllLinks => match self.store.clear_all().await {
                Ok(()) => {
                    self.broadcaster.publish(&Broadcast::LinksCleared);
                    Reply::ok()
                }
                Err(e) => failure(kind, &e),
            },
        }
    }

    /// Decode, dispatch, and encode. Every input yields a reply, including
    /// unknown or malformed requests.
    pub async fn handle_payload(&self, payload: &[u8]) -> Bytes {
        let reply = match JsonCodec::decode_request(payload) {
            Ok(request) => self.handle(request).await,
            Err(ProtocolError::UnknownMessageType(kind)) => {
                warn!(?kind, "request rejected: unknown type");
                Reply::unknown_type()
            }
            Err(e) => {
                warn!(error = %e, "request rejected");
                Reply::failure(e.to_string())
            }
        };
        encode(&reply)
    }

    /// Answer envelopes from `inbox` until it closes or `shutdown` resolves.
    ///
    /// Each envelope is handled on its own task so a slow store call never
    /// holds up other requests. On shutdown the inbox stops accepting new
    /// requests, already queued ones are still answered, and the returned
    /// task finishes once every reply has been sent.
    pub fn serve<S>(self, mut inbox: Inbox, shutdown: S) -> JoinHandle<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            info!("gateway serving");
            let mut in_flight = JoinSet::new();
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                        if let Err(e) = done {
                            error!(error = %e, "request task failed");
                        }
                    }
                    envelope = inbox.recv() => match envelope {
                        Some(envelope) => {
                            in_flight.spawn(self.clone().answer(envelope));
                        }
                        None => break,
                    },
                }
            }

            inbox.close();
            while let Some(envelope) = inbox.recv().await {
                in_flight.spawn(self.clone().answer(envelope));
            }
            while let Some(done) = in_flight.join_next().await {
                if let Err(e) = done {
                    error!(error = %e, "request task failed");
                }
            }
            info!("gateway stopped");
        })
    }

    async fn answer(self, envelope: Envelope) {
        let origin = envelope.origin();
        let reply = self.handle_payload(envelope.payload()).await;
        if !envelope.respond(reply) {
            debug!(context = %origin.short_id(), "requester left before the reply");
        }
    }
}

fn failure(kind: &str, err: &dyn std::error::Error) -> Reply {
    warn!(request = kind, error = %err, "store operation failed");
    let text = err.to_string();
    if text.is_empty() {
        Reply::failure(UNKNOWN_ERROR)
    } else {
        Reply::failure(text)
    }
}

fn encode(reply: &Reply) -> Bytes {
    match JsonCodec::encode_reply(reply) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "reply not encodable");
            JsonCodec::encode_reply(&Reply::failure(e.to_string()))
                .or_else(|_| JsonCodec::encode_reply(&Reply::failure(UNKNOWN_ERROR)))
                .unwrap_or_default()
        }
    }
}
