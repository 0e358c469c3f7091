use std::time::Duration;

use linkstash_protocol::Transport;
use tokio::time;
use tracing::{debug, info};

use crate::client::StoreClient;
use crate::error::HandshakeError;

/// How a context probes the gateway before trusting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Delay between probes.
    pub interval: Duration,
    /// Give up after this many probes. `None` keeps probing forever.
    pub max_attempts: Option<u32>,
}

impl ReadinessPolicy {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts.max(1)),
        }
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::unbounded(Duration::from_millis(100))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakeState {
    Waiting,
    Ready,
}

/// Probes the gateway until it reports a ready store. Once `Ready` it never
/// probes again.
pub struct ReadinessHandshake<'a, T> {
    client: &'a StoreClient<T>,
    policy: ReadinessPolicy,
    state: HandshakeState,
    attempts: u32,
}

impl<'a, T: Transport> ReadinessHandshake<'a, T> {
    pub fn new(client: &'a StoreClient<T>, policy: ReadinessPolicy) -> Self {
        Self {
            client,
            policy,
            state: HandshakeState::Waiting,
            attempts: 0,
        }
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Probes sent so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn wait_until_ready(&mut self) -> Result<(), HandshakeError> {
        if self.state == HandshakeState::Ready {
            return Ok(());
        }
        let context = self.client.origin().short_id();
        loop {
            self.attempts += 1;
            match self.client.ping().await {
                Ok(true) => {
                    self.state = HandshakeState::Ready;
                    info!(context = %context, attempts = self.attempts, "gateway ready");
                    return Ok(());
                }
                Ok(false) => {
                    debug!(context = %context, attempt = self.attempts, "gateway reachable, store not open yet");
                }
                Err(e) => {
                    debug!(context = %context, attempt = self.attempts, error = %e, "gateway probe failed");
                }
            }
            if let Some(max) = self.policy.max_attempts {
                if self.attempts >= max {
                    return Err(HandshakeError::GaveUp {
                        attempts: self.attempts,
                    });
                }
            }
            time::sleep(self.policy.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::Scripted;
    use linkstash_protocol::TransportError;
    use serde_json::json;

    const FAST: Duration = Duration::from_millis(1);

    #[test]
    fn default_policy_is_unbounded_100ms() {
        let policy = ReadinessPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(100));
        assert_eq!(policy.max_attempts, None);
    }

    #[tokio::test]
    async fn retries_until_ready() {
        let client = StoreClient::new(Scripted::new([
            Err(TransportError::Disconnected),
            Ok(json!({"success": true, "ready": false})),
            Ok(json!({"success": false, "error": "boom"})),
            Ok(json!({"success": true, "ready": true})),
        ]));
        let mut handshake = ReadinessHandshake::new(&client, ReadinessPolicy::unbounded(FAST));
        assert_eq!(handshake.state(), HandshakeState::Waiting);
        handshake.wait_until_ready().await.unwrap();
        assert_eq!(handshake.state(), HandshakeState::Ready);
        assert_eq!(handshake.attempts(), 4);
    }

    #[tokio::test]
    async fn ready_is_terminal() {
        let client = StoreClient::new(Scripted::new([Ok(json!({"success": true, "ready": true}))]));
        let mut handshake = ReadinessHandshake::new(&client, ReadinessPolicy::unbounded(FAST));
        handshake.wait_until_ready().await.unwrap();
        handshake.wait_until_ready().await.unwrap();
        assert_eq!(handshake.attempts(), 1);
    }

    #[tokio::test]
    async fn bounded_policy_gives_up() {
        let client = StoreClient::new(Scripted::new([
            Ok(json!({"success": true, "ready": false})),
            Ok(json!({"success": true, "ready": false})),
            Ok(json!({"success": true, "ready": true})),
        ]));
        let mut handshake = ReadinessHandshake::new(&client, ReadinessPolicy::bounded(FAST, 2));
        let err = handshake.wait_until_ready().await.unwrap_err();
        assert_eq!(err, HandshakeError::GaveUp { attempts: 2 });
        assert_eq!(handshake.state(), HandshakeState::Waiting);
    }
}
