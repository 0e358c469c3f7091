//! Durable link storage for linkstash.
//!
//! The [`LinkStore`] is the single owner of captured links. It wraps a
//! [`LinkEngine`] with an explicit lifecycle
//! (`Uninitialized -> Opening -> Ready -> Closed`) and ensure-initialized
//! semantics: every operation opens the store first if needed.
//!
//! # Engines
//!
//! - [`MemoryEngine`] -- index-only engine for tests and embedding
//! - [`FileEngine`] -- schema file plus a CRC-framed append log on disk
//!
//! # Design Rules
//!
//! 1. Records are immutable once written. The only mutation is a full clear.
//! 2. The `timestamp` index always covers exactly the primary collection.
//! 3. Enumeration is newest first (descending `timestamp`).
//! 4. Schema creation and upgrade are idempotent and run on every open.
//! 5. Concurrent opens from the same context collapse into one engine open.

pub mod config;
pub mod engine;
pub mod error;
pub mod file;
pub mod index;
pub mod log;
pub mod memory;
pub mod schema;
pub mod store;

pub use config::{StoreConfig, SyncMode};
pub use engine::LinkEngine;
pub use error::{StoreError, StoreResult};
pub use file::FileEngine;
pub use index::LinkIndexes;
pub use memory::MemoryEngine;
pub use schema::{SchemaStatus, SCHEMA_VERSION};
pub use store::{LinkStore, Ready, StorePhase};
