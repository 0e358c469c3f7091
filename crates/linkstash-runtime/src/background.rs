use std::sync::Arc;

use linkstash_gateway::{Broadcaster, FanoutReport, Gateway};
use linkstash_protocol::{channel, Broadcast, ContextId, Endpoint};
use linkstash_store::LinkStore;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::tab::TabContext;

/// The context that owns the store.
///
/// Dropping a `Background` without calling [`shutdown`](Self::shutdown)
/// still stops the gateway loop, but leaves the store open.
pub struct Background {
    context: ContextId,
    config: RuntimeConfig,
    gateway: Gateway,
    endpoint: Endpoint,
    stop: Option<oneshot::Sender<()>>,
    serving: Option<JoinHandle<()>>,
    opening: Option<JoinHandle<()>>,
}

impl Background {
    /// Start the gateway, then open the store in the background.
    ///
    /// Requests are accepted right away. Until the open finishes, `PING`
    /// reports `ready: false` and data requests wait for the store.
    pub fn launch(store: LinkStore, config: RuntimeConfig) -> Self {
        let context = ContextId::new();
        let store = Arc::new(store);
        let broadcaster = Broadcaster::new(config.gateway.broadcast_capacity);
        let gateway = Gateway::new(Arc::clone(&store), broadcaster);

        let (endpoint, inbox) = channel(config.gateway.inbox_capacity);
        let (stop, stopped) = oneshot::channel::<()>();
        let serving = gateway.clone().serve(inbox, async move {
            let _ = stopped.await;
        });

        let opening = tokio::spawn(async move {
            match store.open().await {
                Ok(ready) => info!(?ready, "store opened"),
                Err(e) => error!(error = %e, "store open failed"),
            }
        });

        info!(context = %context.short_id(), "background context launched");
        Self {
            context,
            config,
            gateway,
            endpoint,
            stop: Some(stop),
            serving: Some(serving),
            opening: Some(opening),
        }
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn store(&self) -> &Arc<LinkStore> {
        self.gateway.store()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Open a new tab context: its own transport, broadcast subscription,
    /// and link summary.
    pub fn connect_tab(&self) -> TabContext {
        let context = ContextId::new();
        let subscription = self.gateway.broadcaster().subscribe(context);
        TabContext::new(
            self.endpoint.connect(context),
            subscription,
            self.config.summary_enabled,
            self.config.handshake,
        )
    }

    /// Relay a settings-surface control message to every tab.
    pub fn publish_control(&self, event: Broadcast) -> FanoutReport {
        self.gateway.broadcaster().publish(&event)
    }

    /// Stop accepting requests, finish the ones in flight, then close the
    /// store.
    pub async fn shutdown(mut self) -> RuntimeResult<()> {
        if let Some(opening) = self.opening.take() {
            if let Err(e) = opening.await {
                error!(error = %e, "store open task failed");
            }
        }
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(serving) = self.serving.take() {
            serving
                .await
                .map_err(|e| RuntimeError::Gateway(e.to_string()))?;
        }
        self.store().close().await;
        info!(context = %self.context.short_id(), "background context shut down");
        Ok(())
    }
}
