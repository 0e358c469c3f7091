use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use linkstash_gateway::Gateway;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;

/// HTTP endpoint paths.
pub mod endpoints {
    pub const HEALTH: &str = "/v1/health";
    pub const MESSAGE: &str = "/v1/message";
}

pub fn build_router(gateway: Gateway, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::MESSAGE, post(handler::message_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway);
    if config.permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
