use serde::{Deserialize, Serialize};

/// Sizing for the gateway's channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Per-subscriber queue length. A subscriber whose queue is full misses
    /// the event.
    pub broadcast_capacity: usize,
    /// Requests that may wait in the inbox before senders are back-pressured.
    pub inbox_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 1024,
            inbox_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.broadcast_capacity, 1024);
        assert_eq!(config.inbox_capacity, 64);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GatewayConfig = serde_json::from_str(r#"{"inbox_capacity": 8}"#).unwrap();
        assert_eq!(config.inbox_capacity, 8);
        assert_eq!(config.broadcast_capacity, 1024);
    }
}
