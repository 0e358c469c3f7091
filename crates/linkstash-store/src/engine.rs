use linkstash_types::{LinkId, LinkRecord};

use crate::error::StoreResult;
use crate::index::LinkIndexes;
use crate::schema::SchemaStatus;

/// Storage engine underneath a [`crate::LinkStore`].
///
/// Engines are driven by exactly one store, which serializes every call.
/// All implementations must satisfy these invariants:
/// - `open` creates or upgrades the schema idempotently and loads existing
///   records; calling it on an open engine must not duplicate anything.
/// - `insert` is atomic: either the record is durable and indexed, or the
///   call fails and nothing changed.
/// - `clear` removes every record, and succeeds on an empty store.
/// - Failures are reported as [`crate::StoreError`], never panics.
pub trait LinkEngine: Send {
    /// Create or upgrade the schema, then load existing records.
    fn open(&mut self) -> StoreResult<SchemaStatus>;

    /// Persist a record that already carries its id.
    fn insert(&mut self, record: LinkRecord) -> StoreResult<()>;

    /// Remove every record.
    fn clear(&mut self) -> StoreResult<()>;

    /// Release underlying resources. Records survive for the next `open`.
    fn close(&mut self);

    /// Loaded primary collection and secondary indexes.
    fn indexes(&self) -> &LinkIndexes;

    fn contains(&self, id: &LinkId) -> bool {
        self.indexes().contains(id)
    }

    /// Snapshot of all records, newest first.
    fn newest_first(&self) -> StoreResult<Vec<LinkRecord>> {
        Ok(self.indexes().newest_first())
    }

    fn with_source(&self, source_url: &str) -> StoreResult<Vec<LinkRecord>> {
        Ok(self.indexes().with_source(source_url))
    }

    fn with_target(&self, target_url: &str) -> StoreResult<Vec<LinkRecord>> {
        Ok(self.indexes().with_target(target_url))
    }
}
