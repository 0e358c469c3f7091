use linkstash_types::LinkRecord;
use tracing::debug;

use crate::engine::LinkEngine;
use crate::error::{StoreError, StoreResult};
use crate::index::LinkIndexes;
use crate::schema::SchemaStatus;

/// In-memory engine.
///
/// Intended for tests and embedding. Records outlive `close` and are only
/// lost when the engine itself is dropped, so reopen behaves like reopening
/// a durable store.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    indexes: LinkIndexes,
    max_records: Option<usize>,
    schema_created: bool,
    open: bool,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that rejects appends once `max_records` are stored.
    pub fn with_quota(max_records: usize) -> Self {
        Self {
            max_records: Some(max_records),
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl LinkEngine for MemoryEngine {
    fn open(&mut self) -> StoreResult<SchemaStatus> {
        self.open = true;
        if self.schema_created {
            return Ok(SchemaStatus::Current);
        }
        self.schema_created = true;
        debug!("memory schema created");
        Ok(SchemaStatus::Created)
    }

    fn insert(&mut self, record: LinkRecord) -> StoreResult<()> {
        if !self.open {
            return Err(StoreError::NotOpen);
        }
        if let Some(limit) = self.max_records {
            if self.indexes.len() >= limit {
                return Err(StoreError::Write(format!(
                    "quota exceeded: store holds {limit} records"
                )));
            }
        }
        let id = record.id().clone();
        if !self.indexes.insert(record) {
            return Err(StoreError::Write(format!("duplicate id {id}")));
        }
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        if !self.open {
            return Err(StoreError::NotOpen);
        }
        self.indexes.clear();
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn indexes(&self) -> &LinkIndexes {
        &self.indexes
    }
}
