use linkstash_client::ReadinessPolicy;
use linkstash_gateway::GatewayConfig;

/// Settings for a [`Background`](crate::Background) and the tabs it serves.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub gateway: GatewayConfig,
    /// Handshake policy new tabs boot with.
    pub handshake: ReadinessPolicy,
    /// Whether new tabs start with their summary enabled.
    pub summary_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            handshake: ReadinessPolicy::default(),
            summary_enabled: true,
        }
    }
}

impl RuntimeConfig {
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_handshake(mut self, policy: ReadinessPolicy) -> Self {
        self.handshake = policy;
        self
    }

    pub fn with_summary_enabled(mut self, enabled: bool) -> Self {
        self.summary_enabled = enabled;
        self
    }
}
