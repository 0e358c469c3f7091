//! Foundation types for linkstash.
//!
//! Every other linkstash crate depends on `linkstash-types`. The types here
//! are the shapes that cross context boundaries and land in durable storage.
//!
//! # Key Types
//!
//! - [`CapturedLink`]: a link as captured by a tab, before persistence
//! - [`LinkRecord`]: a persisted link carrying its store-assigned [`LinkId`]
//! - [`LinkId`]: `"<epoch-ms>-<random-suffix>"` record identifier
//!
//! `createdAt` is never stored: it is always derived from `timestamp` via
//! [`iso_from_millis`].

pub mod error;
pub mod id;
pub mod link;
pub mod time;

pub use error::LinkError;
pub use id::LinkId;
pub use link::{CapturedLink, LinkRecord};
pub use time::{iso_from_millis, now_millis};
