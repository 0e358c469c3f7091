use std::future::Future;

use linkstash_gateway::Gateway;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// HTTP front for a running gateway.
pub struct LinkstashServer {
    config: ServerConfig,
    gateway: Gateway,
}

impl LinkstashServer {
    pub fn new(config: ServerConfig, gateway: Gateway) -> Self {
        Self { config, gateway }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.gateway.clone(), &self.config)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<S>(self, shutdown: S) -> ServerResult<()>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(addr = %self.config.bind_addr, "linkstash server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstash_gateway::Broadcaster;
    use linkstash_store::LinkStore;
    use std::sync::Arc;

    fn server(config: ServerConfig) -> LinkstashServer {
        let gateway = Gateway::new(Arc::new(LinkStore::in_memory()), Broadcaster::default());
        LinkstashServer::new(config, gateway)
    }

    #[test]
    fn server_construction() {
        let server = server(ServerConfig::default());
        assert_eq!(server.config().bind_addr.port(), 7878);
        let _router = server.router();
    }

    #[tokio::test]
    async fn serves_until_shutdown() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        server(config).serve(async {}).await.unwrap();
    }
}
