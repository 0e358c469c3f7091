use linkstash_protocol::{ContextId, JsonCodec, Reply, Request, Transport};
use linkstash_types::{CapturedLink, LinkRecord};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

const SAVE_FAILED: &str = "Failed to save link";
const LIST_FAILED: &str = "Failed to get links";
const CLEAR_FAILED: &str = "Failed to clear links";
const PING_FAILED: &str = "Unknown error occurred";

/// Typed front for the gateway. Does not retry.
pub struct StoreClient<T> {
    transport: T,
}

impl<T: Transport> StoreClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn origin(&self) -> ContextId {
        self.transport.origin()
    }

    /// Liveness probe. `Ok(false)` means the gateway is reachable but its
    /// store is not open yet.
    pub async fn ping(&self) -> ClientResult<bool> {
        let reply = self.call(&Request::Ping, PING_FAILED).await?;
        Ok(reply.ready == Some(true))
    }

    pub async fn append(&self, link: CapturedLink) -> ClientResult<()> {
        self.call(&Request::SaveLink { link }, SAVE_FAILED).await?;
        Ok(())
    }

    /// All stored links, newest first.
    pub async fn list_all(&self) -> ClientResult<Vec<LinkRecord>> {
        let reply = self.call(&Request::GetAllLinks, LIST_FAILED).await?;
        Ok(reply.links.unwrap_or_default())
    }

    pub async fn clear_all(&self) -> ClientResult<()> {
        self.call(&Request::ClearAllLinks, CLEAR_FAILED).await?;
        Ok(())
    }

    async fn call(&self, request: &Request, fallback: &str) -> ClientResult<Reply> {
        let payload = JsonCodec::encode_request(request)?;
        let raw = self.transport.send(payload).await?;
        let reply = JsonCodec::decode_reply(&raw)?;
        if reply.success {
            return Ok(reply);
        }
        let message = reply
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_owned());
        debug!(
            context = %self.origin().short_id(),
            request = request.type_name(),
            error = %message,
            "request failed"
        );
        Err(ClientError::Application(message))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use linkstash_protocol::{TransportError, TransportResult};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers each send with the next scripted outcome and records what
    /// was sent.
    pub(crate) struct Scripted {
        origin: ContextId,
        script: Mutex<VecDeque<TransportResult<Value>>>,
        pub(crate) sent: Mutex<Vec<Value>>,
    }

    impl Scripted {
        pub(crate) fn new(script: impl IntoIterator<Item = TransportResult<Value>>) -> Self {
            Self {
                origin: ContextId::new(),
                script: Mutex::new(script.into_iter().collect()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        fn origin(&self) -> ContextId {
            self.origin
        }

        async fn send(&self, payload: Bytes) -> TransportResult<Bytes> {
            self.sent
                .lock()
                .unwrap()
                .push(serde_json::from_slice(&payload).unwrap());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(TransportError::Disconnected));
            next.map(|value| Bytes::from(value.to_string()))
        }
    }

    #[tokio::test]
    async fn each_call_sends_one_request() {
        let client = StoreClient::new(Scripted::new([
            Ok(json!({"success": true})),
            Ok(json!({"success": true, "links": []})),
            Ok(json!({"success": true})),
        ]));
        client
            .append(CapturedLink::new("s", "t", 1).unwrap())
            .await
            .unwrap();
        assert!(client.list_all().await.unwrap().is_empty());
        client.clear_all().await.unwrap();

        let sent = client.transport.sent.lock().unwrap();
        let types: Vec<_> = sent.iter().map(|v| v["type"].as_str().unwrap()).collect();
        assert_eq!(types, ["SAVE_LINK", "GET_ALL_LINKS", "CLEAR_ALL_LINKS"]);
        assert_eq!(sent[0]["link"]["targetUrl"], "t");
    }

    #[tokio::test]
    async fn list_decodes_records() {
        let client = StoreClient::new(Scripted::new([Ok(json!({
            "success": true,
            "links": [{
                "id": "2000-aaaaaaaaa",
                "sourceUrl": "https://a.example",
                "targetUrl": "https://b.example",
                "timestamp": 2000,
                "createdAt": "1970-01-01T00:00:02.000Z"
            }]
        }))]));
        let links = client.list_all().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id().as_str(), "2000-aaaaaaaaa");
        assert_eq!(links[0].timestamp(), 2000);
    }

    #[tokio::test]
    async fn success_without_links_is_empty() {
        let client = StoreClient::new(Scripted::new([Ok(json!({"success": true}))]));
        assert!(client.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn application_error_carries_gateway_message() {
        let client = StoreClient::new(Scripted::new([Ok(
            json!({"success": false, "error": "write failed: disk full"}),
        )]));
        let err = client.clear_all().await.unwrap_err();
        assert!(matches!(err, ClientError::Application(ref m) if m == "write failed: disk full"));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn failure_without_message_uses_fallback() {
        let client = StoreClient::new(Scripted::new([
            Ok(json!({"success": false})),
            Ok(json!({"success": false, "error": ""})),
            Ok(json!({"success": false})),
        ]));
        let save = client.append(CapturedLink::new("s", "t", 1).unwrap()).await;
        assert_eq!(save.unwrap_err().to_string(), "Failed to save link");
        assert_eq!(client.list_all().await.unwrap_err().to_string(), "Failed to get links");
        assert_eq!(client.clear_all().await.unwrap_err().to_string(), "Failed to clear links");
    }

    #[tokio::test]
    async fn transport_failures_stay_transport() {
        let client = StoreClient::new(Scripted::new([Err(TransportError::NoReply)]));
        let err = client.list_all().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::NoReply)));
        assert!(client.ping().await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn garbage_reply_is_protocol_error() {
        let client = StoreClient::new(Scripted::new([Ok(json!([1, 2, 3]))]));
        assert!(matches!(client.ping().await, Err(ClientError::Protocol(_))));
    }

    #[tokio::test]
    async fn ping_ready_flag() {
        let client = StoreClient::new(Scripted::new([
            Ok(json!({"success": true, "ready": false})),
            Ok(json!({"success": true, "ready": true})),
            Ok(json!({"success": true})),
        ]));
        assert!(!client.ping().await.unwrap());
        assert!(client.ping().await.unwrap());
        assert!(!client.ping().await.unwrap());
    }
}
