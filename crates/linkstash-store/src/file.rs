use std::fs;

use linkstash_types::LinkRecord;
use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::engine::LinkEngine;
use crate::error::{StoreError, StoreResult};
use crate::index::LinkIndexes;
use crate::log::LinkLog;
use crate::schema::{self, SchemaStatus};

const LOG_FILE: &str = "links.log";

/// On-disk engine: `schema.json` plus a CRC-framed append log.
///
/// Indexes are rebuilt from the log on every open; the log is the source of
/// truth and the indexes are a projection of it.
pub struct FileEngine {
    config: StoreConfig,
    log: Option<LinkLog>,
    indexes: LinkIndexes,
}

impl FileEngine {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            log: None,
            indexes: LinkIndexes::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn log_mut(&mut self) -> StoreResult<&mut LinkLog> {
        self.log.as_mut().ok_or(StoreError::NotOpen)
    }
}

impl LinkEngine for FileEngine {
    fn open(&mut self) -> StoreResult<SchemaStatus> {
        let dir = self.config.path.clone();
        let open_err = |reason: String| StoreError::Open {
            path: dir.clone(),
            reason,
        };

        fs::create_dir_all(&dir).map_err(|e| open_err(e.to_string()))?;
        let status = schema::ensure(&dir)?;

        let mut log = LinkLog::open(&dir.join(LOG_FILE), self.config.sync)
            .map_err(|e| open_err(e.to_string()))?;
        let mut indexes = LinkIndexes::new();
        for record in log.recover()? {
            let id = record.id().clone();
            if !indexes.insert(record) {
                warn!(%id, "duplicate id in log; keeping first occurrence");
            }
        }

        info!(
            path = %dir.display(),
            records = indexes.len(),
            ?status,
            "file engine opened"
        );
        self.indexes = indexes;
        self.log = Some(log);
        Ok(status)
    }

    fn insert(&mut self, record: LinkRecord) -> StoreResult<()> {
        if let Some(limit) = self.config.max_records {
            if self.indexes.len() >= limit {
                return Err(StoreError::Write(format!(
                    "quota exceeded: store holds {limit} records"
                )));
            }
        }
        if self.indexes.contains(record.id()) {
            return Err(StoreError::Write(format!("duplicate id {}", record.id())));
        }
        self.log_mut()?.append(&record)?;
        self.indexes.insert(record);
        Ok(())
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.log_mut()?.truncate()?;
        self.indexes.clear();
        Ok(())
    }

    fn close(&mut self) {
        if self.log.take().is_some() {
            self.indexes.clear();
            info!(path = %self.config.path.display(), "file engine closed");
        }
    }

    fn indexes(&self) -> &LinkIndexes {
        &self.indexes
    }
}

impl std::fmt::Debug for FileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileEngine")
            .field("path", &self.config.path)
            .field("open", &self.log.is_some())
            .field("record_count", &self.indexes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkstash_types::{CapturedLink, LinkId};

    fn record(id: &str, source: &str, ts: i64) -> LinkRecord {
        CapturedLink::new(source, "https://t.example", ts)
            .unwrap()
            .into_record(LinkId::parse(id).unwrap())
    }

    fn engine_in(dir: &tempfile::TempDir) -> FileEngine {
        FileEngine::new(StoreConfig::at(dir.path().join("store")))
    }

    fn ids_newest_first(engine: &FileEngine) -> Vec<String> {
        engine
            .newest_first()
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    #[test]
    fn open_fresh_then_existing() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);
        assert_eq!(engine.open().unwrap(), SchemaStatus::Created);
        engine.close();
        assert_eq!(engine.open().unwrap(), SchemaStatus::Current);
    }

    #[test]
    fn records_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut engine = engine_in(&dir);
            engine.open().unwrap();
            engine.insert(record("a", "https://s.example", 1000)).unwrap();
            engine.insert(record("b", "https://s.example", 2000)).unwrap();
            engine.close();
        }

        let mut engine = engine_in(&dir);
        engine.open().unwrap();
        let ids: Vec<String> = engine
            .newest_first()
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(engine.indexes().is_consistent());
    }

    #[test]
    fn clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);
        engine.open().unwrap();
        engine.insert(record("a", "s", 1)).unwrap();
        engine.clear().unwrap();
        engine.clear().unwrap();
        engine.close();

        engine.open().unwrap();
        assert!(engine.newest_first().unwrap().is_empty());
    }

    #[test]
    fn source_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);
        engine.open().unwrap();
        engine.insert(record("a", "https://one.example", 1)).unwrap();
        engine.insert(record("b", "https://two.example", 2)).unwrap();
        engine.close();

        engine.open().unwrap();
        let hits = engine.with_source("https://one.example").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id().as_str(), "a");
    }

    #[test]
    fn inserts_after_a_torn_tail_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("store").join(LOG_FILE);
        let mut engine = engine_in(&dir);
        engine.open().unwrap();
        engine.insert(record("a", "s", 1)).unwrap();
        engine.insert(record("b", "s", 2)).unwrap();
        engine.close();

        let len = fs::metadata(&log_path).unwrap().len();
        fs::OpenOptions::new()
            .write(true)
            .open(&log_path)
            .unwrap()
            .set_len(len - 3)
            .unwrap();

        engine.open().unwrap();
        assert_eq!(ids_newest_first(&engine), vec!["a"]);
        engine.insert(record("c", "s", 3)).unwrap();
        engine.close();

        engine.open().unwrap();
        assert_eq!(ids_newest_first(&engine), vec!["c", "a"]);
    }

    #[test]
    fn inserts_after_a_garbled_header_survive_reopen() {
        use std::io::{Seek, SeekFrom, Write};

        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("store").join(LOG_FILE);
        let mut engine = engine_in(&dir);
        engine.open().unwrap();
        engine.insert(record("a", "s", 1)).unwrap();
        engine.close();
        let first_end = fs::metadata(&log_path).unwrap().len();

        engine.open().unwrap();
        engine.insert(record("b", "s", 2)).unwrap();
        engine.close();

        {
            let mut file = fs::OpenOptions::new().write(true).open(&log_path).unwrap();
            file.seek(SeekFrom::Start(first_end)).unwrap();
            file.write_all(&u32::MAX.to_le_bytes()).unwrap();
        }

        engine.open().unwrap();
        assert_eq!(ids_newest_first(&engine), vec!["a"]);
        engine.insert(record("c", "s", 3)).unwrap();
        engine.close();

        engine.open().unwrap();
        assert_eq!(ids_newest_first(&engine), vec!["c", "a"]);
        assert!(engine.indexes().is_consistent());
    }

    #[test]
    fn quota_exceeded_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = FileEngine::new(StoreConfig {
            max_records: Some(1),
            ..StoreConfig::at(dir.path())
        });
        engine.open().unwrap();
        engine.insert(record("a", "s", 1)).unwrap();
        assert!(matches!(
            engine.insert(record("b", "s", 2)),
            Err(StoreError::Write(_))
        ));
    }

    #[test]
    fn insert_while_closed_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_in(&dir);
        assert!(matches!(
            engine.insert(record("a", "s", 1)),
            Err(StoreError::NotOpen)
        ));
    }

    #[test]
    fn open_on_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let mut engine = FileEngine::new(StoreConfig::at(&blocker));
        assert!(matches!(engine.open(), Err(StoreError::Open { .. })));
    }
}
