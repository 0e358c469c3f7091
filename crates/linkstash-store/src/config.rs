use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Flush/sync strategy for the append log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every append.
    EveryWrite,
    /// Flush to the OS page cache only.
    #[default]
    OsDefault,
}

/// Configuration for the on-disk [`crate::FileEngine`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `schema.json` and `links.log`.
    pub path: PathBuf,
    /// Upper bound on stored records; appends beyond it fail.
    pub max_records: Option<usize>,
    pub sync: SyncMode,
}

impl StoreConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".linkstash"),
            max_records: None,
            sync: SyncMode::default(),
        }
    }
}
