use linkstash_client::{
    LinkSummary, Reaction, ReadinessHandshake, ReadinessPolicy, StoreClient,
};
use linkstash_gateway::Subscription;
use linkstash_protocol::{ChannelTransport, ContextId};
use linkstash_types::CapturedLink;
use tracing::debug;

use crate::error::RuntimeResult;

/// A non-owning context: talks to the store only through its client.
pub struct TabContext {
    client: StoreClient<ChannelTransport>,
    subscription: Subscription,
    summary: LinkSummary,
    policy: ReadinessPolicy,
}

impl TabContext {
    pub(crate) fn new(
        transport: ChannelTransport,
        subscription: Subscription,
        summary_enabled: bool,
        policy: ReadinessPolicy,
    ) -> Self {
        Self {
            client: StoreClient::new(transport),
            subscription,
            summary: LinkSummary::new(summary_enabled),
            policy,
        }
    }

    pub fn context(&self) -> ContextId {
        self.client.origin()
    }

    pub fn client(&self) -> &StoreClient<ChannelTransport> {
        &self.client
    }

    pub fn summary(&self) -> &LinkSummary {
        &self.summary
    }

    /// Handshake with the policy from [`RuntimeConfig`](crate::RuntimeConfig).
    pub async fn boot_default(&mut self) -> RuntimeResult<()> {
        self.boot(self.policy).await
    }

    /// Handshake with `policy`, then load the summary. A failed summary load
    /// is left in the summary's status and does not fail the boot.
    pub async fn boot(&mut self, policy: ReadinessPolicy) -> RuntimeResult<()> {
        ReadinessHandshake::new(&self.client, policy)
            .wait_until_ready()
            .await?;
        if self.summary.is_enabled() {
            let _ = self.summary.refresh(&self.client).await;
        }
        Ok(())
    }

    /// Record a link followed from `source_url` to `target_url` right now.
    pub async fn capture(
        &self,
        source_url: impl Into<String>,
        target_url: impl Into<String>,
    ) -> RuntimeResult<CapturedLink> {
        let link = CapturedLink::now(source_url, target_url)?;
        self.client.append(link.clone()).await?;
        Ok(link)
    }

    /// Apply every queued broadcast to the summary. Returns how many events
    /// were applied.
    pub async fn pump(&mut self) -> usize {
        let mut applied = 0;
        let mut refresh = false;
        while let Some(event) = self.subscription.try_recv() {
            applied += 1;
            match self.summary.apply(&event) {
                Reaction::RefreshNeeded => refresh = true,
                Reaction::Updated | Reaction::Ignored => {}
            }
            debug!(context = %self.context().short_id(), event = event.type_name(), "broadcast applied");
        }
        if refresh {
            let _ = self.summary.refresh(&self.client).await;
        }
        applied
    }
}
