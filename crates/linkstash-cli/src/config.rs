use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use linkstash_client::ReadinessPolicy;
use linkstash_gateway::GatewayConfig;
use linkstash_runtime::RuntimeConfig;
use linkstash_server::ServerConfig;
use linkstash_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Contents of `linkstash.toml`. Every section and field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StashConfig {
    pub store: StoreConfig,
    pub handshake: HandshakeConfig,
    pub gateway: GatewayConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    pub interval_ms: u64,
    /// Unset means probe forever.
    pub max_attempts: Option<u32>,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        let policy = ReadinessPolicy::default();
        Self {
            interval_ms: policy.interval.as_millis() as u64,
            max_attempts: policy.max_attempts,
        }
    }
}

impl HandshakeConfig {
    pub fn policy(&self) -> ReadinessPolicy {
        let interval = Duration::from_millis(self.interval_ms);
        match self.max_attempts {
            Some(n) => ReadinessPolicy::bounded(interval, n),
            None => ReadinessPolicy::unbounded(interval),
        }
    }
}

impl StashConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_handshake(self.handshake.policy())
            .with_gateway(self.gateway.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstash_store::SyncMode;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StashConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StashConfig::default());
        assert_eq!(config.handshake.policy(), ReadinessPolicy::default());
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkstash.toml");
        std::fs::write(
            &path,
            r#"
[store]
path = "/var/lib/linkstash"
max_records = 500
sync = "every-write"

[handshake]
max_attempts = 20

[gateway]
broadcast_capacity = 16

[server]
bind_addr = "0.0.0.0:8080"
"#,
        )
        .unwrap();

        let config = StashConfig::load(&path).unwrap();
        assert_eq!(config.store.max_records, Some(500));
        assert_eq!(config.store.sync, SyncMode::EveryWrite);
        assert_eq!(config.handshake.interval_ms, 100);
        assert_eq!(
            config.handshake.policy(),
            ReadinessPolicy::bounded(Duration::from_millis(100), 20)
        );
        assert_eq!(config.gateway.broadcast_capacity, 16);
        assert_eq!(config.gateway.inbox_capacity, 64);
        assert_eq!(config.server.bind_addr.port(), 8080);

        let runtime = config.runtime();
        assert_eq!(runtime.gateway.broadcast_capacity, 16);
        assert_eq!(runtime.handshake.max_attempts, Some(20));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linkstash.toml");
        std::fs::write(&path, "[store]\nsync = \"sometimes\"\n").unwrap();
        let err = StashConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }
}
