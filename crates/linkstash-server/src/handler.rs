use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use linkstash_gateway::Gateway;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Whether the store is open.
    pub ready: bool,
}

impl HealthResponse {
    pub fn new(ready: bool) -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            ready,
        }
    }
}

pub async fn health_handler(State(gateway): State<Gateway>) -> Json<HealthResponse> {
    Json(HealthResponse::new(gateway.store().is_ready()))
}

/// Hand the body to the gateway and return its reply. Failures travel in
/// the reply body, so the status is always 200.
pub async fn message_handler(State(gateway): State<Gateway>, body: Bytes) -> impl IntoResponse {
    let reply = gateway.handle_payload(&body).await;
    ([(header::CONTENT_TYPE, "application/json")], reply)
}
