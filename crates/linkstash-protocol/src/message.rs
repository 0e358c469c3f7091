use linkstash_types::{CapturedLink, LinkRecord};
use serde::{Deserialize, Serialize};

/// Largest encoded message accepted by the codec.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Error text returned for any request whose `type` is not recognized.
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type";

/// Wire values of the `type` tag.
pub mod message_types {
    pub const PING: &str = "PING";
    pub const SAVE_LINK: &str = "SAVE_LINK";
    pub const GET_ALL_LINKS: &str = "GET_ALL_LINKS";
    pub const CLEAR_ALL_LINKS: &str = "CLEAR_ALL_LINKS";

    pub const LINK_ADDED: &str = "LINK_ADDED";
    pub const LINKS_CLEARED: &str = "LINKS_CLEARED";
    pub const OVERLAY_TOGGLE: &str = "OVERLAY_TOGGLE";
    pub const OVERLAY_VISIBILITY_TOGGLE: &str = "OVERLAY_VISIBILITY_TOGGLE";
    pub const RESET_OVERLAY_POSITION: &str = "RESET_OVERLAY_POSITION";

    /// Every request tag the gateway handles.
    pub const REQUESTS: [&str; 4] = [PING, SAVE_LINK, GET_ALL_LINKS, CLEAR_ALL_LINKS];
}

/// Requests a client context sends to the gateway. Each gets one [`Reply`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    /// Liveness probe; answered even while the store is still opening.
    Ping,
    SaveLink { link: CapturedLink },
    GetAllLinks,
    ClearAllLinks,
}

impl Request {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ping => message_types::PING,
            Self::SaveLink { .. } => message_types::SAVE_LINK,
            Self::GetAllLinks => message_types::GET_ALL_LINKS,
            Self::ClearAllLinks => message_types::CLEAR_ALL_LINKS,
        }
    }
}

/// The single reply to a [`Request`].
///
/// Wire shape: `{ success, ready?, links?, error? }`; absent fields are
/// omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    /// `{ success: true, ready }` in answer to `PING`.
    pub fn pong(ready: bool) -> Self {
        Self {
            success: true,
            ready: Some(ready),
            ..Self::default()
        }
    }

    /// `{ success: true }`.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// `{ success: true, links }`.
    pub fn links(links: Vec<LinkRecord>) -> Self {
        Self {
            success: true,
            links: Some(links),
            ..Self::default()
        }
    }

    /// `{ success: false, error }`.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn unknown_type() -> Self {
        Self::failure(UNKNOWN_MESSAGE_TYPE)
    }
}

/// Fire-and-forget notifications pushed to every reachable context.
///
/// Events describe what changed; each receiving context decides on its own
/// what to do about it. The overlay control events are carried for the
/// settings surface and are not interpreted by the store side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broadcast {
    /// A link was stored; `url` is its target address.
    LinkAdded { url: String },
    /// The store was fully cleared.
    LinksCleared,
    OverlayToggle { enabled: bool },
    OverlayVisibilityToggle { visible: bool },
    ResetOverlayPosition,
}

impl Broadcast {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::LinkAdded { .. } => message_types::LINK_ADDED,
            Self::LinksCleared => message_types::LINKS_CLEARED,
            Self::OverlayToggle { .. } => message_types::OVERLAY_TOGGLE,
            Self::OverlayVisibilityToggle { .. } => message_types::OVERLAY_VISIBILITY_TOGGLE,
            Self::ResetOverlayPosition => message_types::RESET_OVERLAY_POSITION,
        }
    }

    /// Whether this event invalidates cached link data.
    pub fn is_invalidation(&self) -> bool {
        matches!(self, Self::LinkAdded { .. } | Self::LinksCleared)
    }
}
