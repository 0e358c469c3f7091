use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::id::LinkId;
use crate::time::{iso_from_millis, now_millis};

/// A hyperlink marked by the user, as produced by the capturing context.
///
/// Invariants (checked on construction and on deserialization):
/// - `source_url` and `target_url` are non-empty
/// - `timestamp` is a representable UTC instant, so [`Self::created_at`]
///   cannot fail
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LinkWire", into = "LinkWire")]
pub struct CapturedLink {
    source_url: String,
    target_url: String,
    timestamp: i64,
}

impl CapturedLink {
    pub fn new(
        source_url: impl Into<String>,
        target_url: impl Into<String>,
        timestamp: i64,
    ) -> Result<Self, LinkError> {
        let source_url = source_url.into();
        let target_url = target_url.into();
        if source_url.trim().is_empty() {
            return Err(LinkError::EmptyField { field: "sourceUrl" });
        }
        if target_url.trim().is_empty() {
            return Err(LinkError::EmptyField { field: "targetUrl" });
        }
        iso_from_millis(timestamp)?;
        Ok(Self {
            source_url,
            target_url,
            timestamp,
        })
    }

    /// Capture a link at the current wall-clock instant.
    pub fn now(
        source_url: impl Into<String>,
        target_url: impl Into<String>,
    ) -> Result<Self, LinkError> {
        Self::new(source_url, target_url, now_millis())
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Capture instant in milliseconds since the UNIX epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// ISO-8601 rendering of [`Self::timestamp`].
    pub fn created_at(&self) -> String {
        // Range was validated in `new`.
        iso_from_millis(self.timestamp).unwrap_or_default()
    }

    /// Attach a store-assigned id, producing the persisted form.
    pub fn into_record(self, id: LinkId) -> LinkRecord {
        LinkRecord { id, link: self }
    }
}

/// The persisted form of a [`CapturedLink`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LinkWire", into = "LinkWire")]
pub struct LinkRecord {
    id: LinkId,
    link: CapturedLink,
}

impl LinkRecord {
    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub fn link(&self) -> &CapturedLink {
        &self.link
    }

    pub fn source_url(&self) -> &str {
        self.link.source_url()
    }

    pub fn target_url(&self) -> &str {
        self.link.target_url()
    }

    pub fn timestamp(&self) -> i64 {
        self.link.timestamp()
    }

    pub fn created_at(&self) -> String {
        self.link.created_at()
    }
}

/// Wire shape shared by both link types (camelCase JSON).
///
/// `createdAt` is always emitted and ignored on input; `id` is present only
/// for records.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    source_url: String,
    target_url: String,
    timestamp: i64,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<CapturedLink> for LinkWire {
    fn from(link: CapturedLink) -> Self {
        let created_at = Some(link.created_at());
        Self {
            id: None,
            source_url: link.source_url,
            target_url: link.target_url,
            timestamp: link.timestamp,
            created_at,
        }
    }
}

impl TryFrom<LinkWire> for CapturedLink {
    type Error = LinkError;

    fn try_from(wire: LinkWire) -> Result<Self, Self::Error> {
        Self::new(wire.source_url, wire.target_url, wire.timestamp)
    }
}

impl From<LinkRecord> for LinkWire {
    fn from(record: LinkRecord) -> Self {
        let mut wire = LinkWire::from(record.link);
        wire.id = Some(record.id.into());
        wire
    }
}

impl TryFrom<LinkWire> for LinkRecord {
    type Error = LinkError;

    fn try_from(mut wire: LinkWire) -> Result<Self, Self::Error> {
        let id = LinkId::parse(wire.id.take().unwrap_or_default())?;
        let link = CapturedLink::try_from(wire)?;
        Ok(link.into_record(id))
    }
}
