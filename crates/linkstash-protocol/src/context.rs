use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one isolated execution context (the background context or
/// a single tab).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short identifier (first 8 hex characters) for logs.
    pub fn short_id(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(8);
        format!("ctx:{s}")
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_id())
    }
}
