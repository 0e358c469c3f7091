//! Context wiring for linkstash.
//!
//! [`Background`] is the privileged context: it owns the
//! [`LinkStore`](linkstash_store::LinkStore), runs the gateway, and is the
//! only place the store is opened. Each [`TabContext`] reaches it purely by
//! message passing and keeps its own [`LinkSummary`](linkstash_client::LinkSummary)
//! in step with broadcast events.

pub mod background;
pub mod config;
pub mod error;
pub mod tab;

pub use background::Background;
pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use tab::TabContext;
