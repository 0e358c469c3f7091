use std::net::{Ipv4Addr, SocketAddr};

use linkstash_protocol::MAX_MESSAGE_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Answer CORS preflights for any origin.
    pub permissive_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 7878)),
            max_body_bytes: MAX_MESSAGE_SIZE,
            permissive_cors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:7878".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_body_bytes, MAX_MESSAGE_SIZE);
        assert!(!c.permissive_cors);
    }

    #[test]
    fn partial_config() {
        let c: ServerConfig = serde_json::from_str(r#"{"bind_addr": "0.0.0.0:9000"}"#).unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.max_body_bytes, MAX_MESSAGE_SIZE);
    }
}
