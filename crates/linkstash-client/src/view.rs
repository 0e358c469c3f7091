use linkstash_protocol::{Broadcast, Transport};
use tracing::{debug, warn};

use crate::client::StoreClient;
use crate::error::ClientResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryStatus {
    /// Never loaded.
    Idle,
    Loaded,
    /// The last refresh failed; the message is what the client reported.
    Error(String),
}

/// What a context should do after applying a broadcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Ignored,
    Updated,
    /// Cached data is no longer trustworthy; call [`LinkSummary::refresh`].
    RefreshNeeded,
}

/// A context's cached list of captured target URLs, newest first.
#[derive(Clone, Debug)]
pub struct LinkSummary {
    enabled: bool,
    visible: bool,
    urls: Vec<String>,
    status: SummaryStatus,
}

impl LinkSummary {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            visible: true,
            urls: Vec::new(),
            status: SummaryStatus::Idle,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn status(&self) -> &SummaryStatus {
        &self.status
    }

    /// Reload from the store. On failure the cached URLs are kept and the
    /// status records the error.
    pub async fn refresh<T: Transport>(&mut self, client: &StoreClient<T>) -> ClientResult<()> {
        match client.list_all().await {
            Ok(links) => {
                self.urls = links
                    .into_iter()
                    .map(|record| record.target_url().to_owned())
                    .collect();
                self.status = SummaryStatus::Loaded;
                debug!(count = self.urls.len(), "summary refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "summary refresh failed");
                self.status = SummaryStatus::Error(e.to_string());
                Err(e)
            }
        }
    }

    pub fn apply(&mut self, event: &Broadcast) -> Reaction {
        match event {
            Broadcast::LinkAdded { url } => {
                if !self.enabled {
                    return Reaction::Ignored;
                }
                self.urls.insert(0, url.clone());
                Reaction::Updated
            }
            Broadcast::LinksCleared => {
                self.urls.clear();
                Reaction::Updated
            }
            Broadcast::OverlayToggle { enabled } => {
                self.enabled = *enabled;
                if *enabled {
                    Reaction::RefreshNeeded
                } else {
                    Reaction::Updated
                }
            }
            Broadcast::OverlayVisibilityToggle { visible } => {
                self.visible = *visible;
                Reaction::Updated
            }
            Broadcast::ResetOverlayPosition => Reaction::Ignored,
        }
    }
}

impl Default for LinkSummary {
    fn default() -> Self {
        Self::new(true)
    }
}
