use std::path::PathBuf;

/// Errors from link store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened (directory, schema, or log failure).
    #[error("failed to open store at {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// On-disk schema is newer than this build understands.
    #[error("schema version {found} is newer than supported version {supported}")]
    SchemaMismatch { found: u32, supported: u32 },

    /// A read against the underlying medium failed.
    #[error("read failed: {0}")]
    Read(String),

    /// The underlying medium rejected a write (I/O, quota, corruption).
    #[error("write failed: {0}")]
    Write(String),

    /// An engine method was called while the engine was closed.
    #[error("store engine is not open")]
    NotOpen,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
