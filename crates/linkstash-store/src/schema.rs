use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Name of the single logical collection.
pub const COLLECTION: &str = "links";

const SCHEMA_FILE: &str = "schema.json";

/// Outcome of running schema creation/upgrade on open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaStatus {
    /// No schema existed; it was created.
    Created,
    /// An older or incomplete schema was brought up to date.
    Upgraded { from: u32 },
    /// The schema was already current; nothing was written.
    Current,
}

/// A declared secondary index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
    pub name: String,
    pub key_path: String,
    pub unique: bool,
}

impl IndexSpec {
    fn non_unique(field: &str) -> Self {
        Self {
            name: field.into(),
            key_path: field.into(),
            unique: false,
        }
    }
}

/// Persisted schema descriptor (`schema.json`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFile {
    pub version: u32,
    pub collection: String,
    pub key_path: String,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

impl SchemaFile {
    /// The schema this build creates.
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            collection: COLLECTION.into(),
            key_path: "id".into(),
            indexes: ["timestamp", "sourceUrl", "targetUrl"]
                .iter()
                .map(|f| IndexSpec::non_unique(f))
                .collect(),
        }
    }

    fn has_all_indexes(&self) -> bool {
        Self::current()
            .indexes
            .iter()
            .all(|wanted| self.indexes.contains(wanted))
    }
}

/// Create or upgrade the schema in `dir`. Safe to call on every open.
pub fn ensure(dir: &Path) -> StoreResult<SchemaStatus> {
    let path = dir.join(SCHEMA_FILE);
    let open_err = |reason: String| StoreError::Open {
        path: path.clone(),
        reason,
    };

    let existing = match fs::read(&path) {
        Ok(bytes) => Some(
            serde_json::from_slice::<SchemaFile>(&bytes)
                .map_err(|e| open_err(format!("corrupt schema file: {e}")))?,
        ),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(open_err(e.to_string())),
    };

    let status = match existing {
        None => SchemaStatus::Created,
        Some(schema) if schema.version > SCHEMA_VERSION => {
            return Err(StoreError::SchemaMismatch {
                found: schema.version,
                supported: SCHEMA_VERSION,
            });
        }
        Some(schema) if schema.version < SCHEMA_VERSION || !schema.has_all_indexes() => {
            SchemaStatus::Upgraded {
                from: schema.version,
            }
        }
        Some(_) => {
            debug!(path = %path.display(), "schema current");
            return Ok(SchemaStatus::Current);
        }
    };

    write_atomic(dir, &SchemaFile::current()).map_err(|e| open_err(e.to_string()))?;
    info!(path = %path.display(), ?status, version = SCHEMA_VERSION, "schema written");
    Ok(status)
}

/// Write via a temp file and rename so a crash never leaves a half schema.
fn write_atomic(dir: &Path, schema: &SchemaFile) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(schema).map_err(io::Error::other)?;
    let tmp = dir.join(format!("{SCHEMA_FILE}.tmp"));
    fs::write(&tmp, bytes)?;
    fs::rename(tmp, dir.join(SCHEMA_FILE))
}
