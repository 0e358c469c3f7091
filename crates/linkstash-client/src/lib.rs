//! Store client for linkstash.
//!
//! A [`StoreClient`] runs in a context that does not own the store. Each
//! method sends exactly one request over a
//! [`Transport`](linkstash_protocol::Transport) and maps the single reply to
//! a typed result. Failures keep their origin apart: the channel failing is
//! [`ClientError::Transport`], the gateway saying no is
//! [`ClientError::Application`].
//!
//! Before a context relies on the gateway it runs the
//! [`ReadinessHandshake`]; [`LinkSummary`] is the context's cached view of
//! stored links, kept fresh by broadcast events.

pub mod client;
pub mod error;
pub mod handshake;
pub mod view;

pub use client::StoreClient;
pub use error::{ClientError, ClientResult, HandshakeError};
pub use handshake::{HandshakeState, ReadinessHandshake, ReadinessPolicy};
pub use view::{LinkSummary, Reaction, SummaryStatus};
