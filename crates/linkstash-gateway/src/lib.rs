//! Store gateway for linkstash.
//!
//! The [`Gateway`] runs next to the [`LinkStore`](linkstash_store::LinkStore)
//! it owns. It turns decoded [`Request`](linkstash_protocol::Request)s into
//! store calls, answers every request exactly once, and after each successful
//! mutation publishes a [`Broadcast`](linkstash_protocol::Broadcast) through
//! the [`Broadcaster`] to every subscribed context.

pub mod config;
pub mod fanout;
pub mod gateway;

pub use config::GatewayConfig;
pub use fanout::{Broadcaster, FanoutReport, Subscription};
pub use gateway::{Gateway, UNKNOWN_ERROR};
