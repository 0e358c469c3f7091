//! HTTP surface for linkstash.
//!
//! Exposes the store gateway to processes outside the runtime: the same
//! JSON messages a tab would send go to `POST /v1/message`, and the reply
//! body is the gateway's reply verbatim.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::HealthResponse;
pub use router::endpoints;
pub use server::LinkstashServer;
