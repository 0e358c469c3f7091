use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use linkstash_types::{CapturedLink, LinkId, LinkRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SyncMode;
use crate::error::{StoreError, StoreResult};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Persisted form of one record inside the log.
///
/// `createdAt` is deliberately absent; it is derived on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct StoredLink {
    id: String,
    source_url: String,
    target_url: String,
    timestamp: i64,
}

impl From<&LinkRecord> for StoredLink {
    fn from(record: &LinkRecord) -> Self {
        Self {
            id: record.id().to_string(),
            source_url: record.source_url().to_owned(),
            target_url: record.target_url().to_owned(),
            timestamp: record.timestamp(),
        }
    }
}

impl StoredLink {
    fn into_record(self) -> Result<LinkRecord, linkstash_types::LinkError> {
        let id = LinkId::parse(self.id)?;
        Ok(CapturedLink::new(self.source_url, self.target_url, self.timestamp)?.into_record(id))
    }
}

/// Append-only record log.
///
/// On-disk format, one entry per record:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized record)]
/// ```
/// Recovery reads front to back; entries failing the CRC or decode are
/// skipped. A torn or garbled header ends recovery and the file is cut back
/// to the end of the last whole entry, so later appends stay readable.
pub struct LinkLog {
    path: PathBuf,
    writer: BufWriter<File>,
    /// Current write offset.
    offset: u64,
    sync: SyncMode,
    /// Set when a failed append could not be rolled back. Cleared by `recover`.
    dirty_tail: bool,
}

impl LinkLog {
    /// Open (or create) the log file at `path`.
    pub fn open(path: &Path, sync: SyncMode) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            offset,
            sync,
            dirty_tail: false,
        })
    }

    /// Append one record. Returns the byte offset the entry starts at.
    ///
    /// On failure the file is cut back to the previous offset so a partial
    /// entry never survives.
    pub fn append(&mut self, record: &LinkRecord) -> StoreResult<u64> {
        if self.dirty_tail {
            return Err(StoreError::Write(
                "log ends in a partial entry; recover before appending".into(),
            ));
        }
        let payload = bincode::serialize(&StoredLink::from(record))
            .map_err(|e| StoreError::Write(format!("encode record: {e}")))?;
        let entry_offset = self.offset;

        if let Err(e) = self.write_entry(&payload) {
            if let Err(re) = self.rollback(entry_offset) {
                self.dirty_tail = true;
                return Err(StoreError::Write(format!("{e}; rollback failed: {re}")));
            }
            return Err(StoreError::Write(e.to_string()));
        }

        self.offset += (HEADER_SIZE + payload.len()) as u64;
        debug!(offset = entry_offset, len = payload.len(), id = %record.id(), "log append");
        Ok(entry_offset)
    }

    /// Recover every valid record from the log, in write order.
    ///
    /// Bytes past the last whole entry are cut off and the write offset is
    /// moved there before returning.
    pub fn recover(&mut self) -> StoreResult<Vec<LinkRecord>> {
        let read_err = |e: io::Error| StoreError::Read(e.to_string());
        let mut file = BufReader::new(File::open(&self.path).map_err(read_err)?);
        let file_len = file.get_ref().metadata().map_err(read_err)?.len();
        let mut records = Vec::new();
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            let mut header = [0u8; HEADER_SIZE];
            file.read_exact(&mut header).map_err(read_err)?;
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
                warn!(offset, length, file_len, "torn log entry; stopping recovery");
                break;
            }

            let mut payload = vec![0u8; length as usize];
            file.read_exact(&mut payload).map_err(read_err)?;
            offset += HEADER_SIZE as u64 + length as u64;

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "CRC mismatch; skipping entry"
                );
                continue;
            }

            let decoded = bincode::deserialize::<StoredLink>(&payload)
                .map_err(|e| e.to_string())
                .and_then(|stored| stored.into_record().map_err(|e| e.to_string()));
            match decoded {
                Ok(record) => records.push(record),
                Err(error) => warn!(offset, %error, "undecodable log entry; skipping"),
            }
        }

        if offset < file_len {
            self.cut_tail(offset, file_len)?;
        } else {
            self.offset = file_len;
        }
        self.dirty_tail = false;

        debug!(recovered = records.len(), "log recovery complete");
        Ok(records)
    }

    /// Remove every entry.
    pub fn truncate(&mut self) -> StoreResult<()> {
        self.writer
            .flush()
            .and_then(|()| self.writer.get_ref().set_len(0))
            .and_then(|()| self.writer.get_ref().sync_all())
            .map_err(|e| StoreError::Write(e.to_string()))?;
        self.offset = 0;
        debug!("log truncated");
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&mut self, payload: &[u8]) -> io::Result<()> {
        let length = u32::try_from(payload.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "record too large"))?;
        let crc = crc32fast::hash(payload);

        self.writer.write_all(&length.to_le_bytes())?;
        self.writer.write_all(&crc.to_le_bytes())?;
        self.writer.write_all(payload)?;
        self.writer.flush()?;
        if self.sync == SyncMode::EveryWrite {
            self.writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    fn cut_tail(&mut self, valid_end: u64, file_len: u64) -> StoreResult<()> {
        warn!(
            valid_end,
            dropped = file_len - valid_end,
            "cutting unreadable log tail"
        );
        self.writer
            .flush()
            .and_then(|()| self.writer.get_ref().set_len(valid_end))
            .and_then(|()| self.writer.get_ref().sync_all())
            .map_err(|e| StoreError::Write(e.to_string()))?;
        self.offset = valid_end;
        Ok(())
    }

    fn rollback(&mut self, offset: u64) -> io::Result<()> {
        let file = self.writer.get_ref().try_clone()?;
        // `into_parts` discards the buffered bytes instead of flushing them.
        let stale = std::mem::replace(&mut self.writer, BufWriter::new(file));
        let (stale_file, _discarded) = stale.into_parts();
        stale_file.set_len(offset).map_err(|e| {
            warn!(offset, error = %e, "log rollback failed");
            e
        })
    }
}
