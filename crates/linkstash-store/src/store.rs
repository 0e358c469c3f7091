use std::fmt;

use linkstash_types::{now_millis, CapturedLink, LinkId, LinkRecord};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::engine::LinkEngine;
use crate::error::StoreResult;
use crate::file::FileEngine;
use crate::memory::MemoryEngine;
use crate::schema::SchemaStatus;

/// Lifecycle phase of a [`LinkStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorePhase {
    Uninitialized,
    Opening,
    Ready,
    Closed,
}

impl fmt::Display for StorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Opening => "opening",
            Self::Ready => "ready",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Successful outcome of [`LinkStore::open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ready {
    /// This call performed the underlying open.
    Opened(SchemaStatus),
    /// The store was already ready; nothing happened.
    AlreadyOpen,
}

/// Exclusive owner of the durable link collection.
///
/// Every data operation runs with ensure-initialized semantics: if the store
/// is not `Ready` it is opened first, so out-of-order calls self-heal. The
/// engine sits behind an async mutex which is the single serialization
/// point: concurrent opens collapse into one engine open, and each write is
/// atomic with respect to every other operation.
pub struct LinkStore {
    engine: Mutex<Box<dyn LinkEngine>>,
    phase: watch::Sender<StorePhase>,
}

impl LinkStore {
    pub fn new(engine: impl LinkEngine + 'static) -> Self {
        let (phase, _) = watch::channel(StorePhase::Uninitialized);
        Self {
            engine: Mutex::new(Box::new(engine)),
            phase,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryEngine::new())
    }

    pub fn on_disk(config: StoreConfig) -> Self {
        Self::new(FileEngine::new(config))
    }

    pub fn phase(&self) -> StorePhase {
        *self.phase.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == StorePhase::Ready
    }

    /// Observe phase transitions without touching the engine lock.
    pub fn watch_phase(&self) -> watch::Receiver<StorePhase> {
        self.phase.subscribe()
    }

    /// Open the store, creating or upgrading the schema.
    ///
    /// Idempotent: returns [`Ready::AlreadyOpen`] without side effects when
    /// the store is already ready.
    pub async fn open(&self) -> StoreResult<Ready> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)
    }

    /// Persist a captured link, assigning it a fresh unique id.
    pub async fn append(&self, link: CapturedLink) -> StoreResult<LinkRecord> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)?;

        let record = link.into_record(fresh_id(&**engine));
        engine.insert(record.clone())?;
        debug!(id = %record.id(), target = record.target_url(), "link appended");
        Ok(record)
    }

    /// All records, newest first. An empty store yields an empty vector.
    pub async fn list_all(&self) -> StoreResult<Vec<LinkRecord>> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)?;
        engine.newest_first()
    }

    /// Records captured on `source_url`, newest first.
    pub async fn find_by_source(&self, source_url: &str) -> StoreResult<Vec<LinkRecord>> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)?;
        engine.with_source(source_url)
    }

    /// Records pointing at `target_url`, newest first.
    pub async fn find_by_target(&self, target_url: &str) -> StoreResult<Vec<LinkRecord>> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)?;
        engine.with_target(target_url)
    }

    /// Remove every record. Succeeds on an empty store.
    pub async fn clear_all(&self) -> StoreResult<()> {
        let mut engine = self.engine.lock().await;
        self.open_locked(&mut **engine)?;
        engine.clear()?;
        info!("all links cleared");
        Ok(())
    }

    /// Release the engine. The next operation reopens it.
    pub async fn close(&self) {
        let mut engine = self.engine.lock().await;
        if self.phase() == StorePhase::Ready {
            engine.close();
        }
        self.phase.send_replace(StorePhase::Closed);
        info!("store closed");
    }

    fn open_locked(&self, engine: &mut dyn LinkEngine) -> StoreResult<Ready> {
        let previous = self.phase();
        if previous == StorePhase::Ready {
            return Ok(Ready::AlreadyOpen);
        }

        self.phase.send_replace(StorePhase::Opening);
        match engine.open() {
            Ok(status) => {
                self.phase.send_replace(StorePhase::Ready);
                info!(?status, "store ready");
                Ok(Ready::Opened(status))
            }
            Err(e) => {
                self.phase.send_replace(previous);
                warn!(error = %e, "store open failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for LinkStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkStore")
            .field("phase", &self.phase())
            .finish()
    }
}

/// Generate an id not yet present in the engine.
fn fresh_id(engine: &dyn LinkEngine) -> LinkId {
    let mut rng = rand::thread_rng();
    loop {
        let id = LinkId::generate(now_millis(), &mut rng);
        if !engine.contains(&id) {
            return id;
        }
    }
}
