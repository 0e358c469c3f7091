use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Store-assigned identifier of a [`crate::LinkRecord`].
///
/// Format: `"<epoch-ms>-<random-suffix>"` where the suffix is nine lowercase
/// base36 characters. Ids are never supplied by callers and never change
/// after the record is written.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkId(String);

impl LinkId {
    /// Generate a fresh id for a write happening at `now_ms`.
    pub fn generate<R: Rng>(now_ms: i64, rng: &mut R) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{now_ms}-{suffix}"))
    }

    /// Wrap an existing id string (e.g. one read back from storage).
    pub fn parse(s: impl Into<String>) -> Result<Self, LinkError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(LinkError::InvalidId(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LinkId {
    type Error = LinkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LinkId> for String {
    fn from(id: LinkId) -> Self {
        id.0
    }
}
