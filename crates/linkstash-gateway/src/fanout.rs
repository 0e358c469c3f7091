use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::Bytes;
use linkstash_protocol::{Broadcast, ContextId, JsonCodec};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

type Registry = Mutex<HashMap<ContextId, Slot>>;

/// One registered listener. `serial` tells a re-subscription of the same
/// context apart from the one it replaced.
struct Slot {
    serial: u64,
    sender: mpsc::Sender<Bytes>,
}

/// Outcome of a single [`Broadcaster::publish`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Best-effort one-to-many delivery of [`Broadcast`] events.
///
/// Publishing never fails. A subscriber whose receiver is gone is pruned;
/// one whose queue is full misses this event and stays registered. Both
/// count as dropped in the returned [`FanoutReport`].
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
    capacity: usize,
    serial: Arc<AtomicU64>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
            serial: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register `context` as a listener. Subscribing a context that is
    /// already registered replaces its previous subscription.
    pub fn subscribe(&self, context: ContextId) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let serial = self.serial.fetch_add(1, Ordering::Relaxed);
        let replaced = lock(&self.registry)
            .insert(context, Slot { serial, sender })
            .is_some();
        debug!(context = %context.short_id(), replaced, "subscriber registered");
        Subscription {
            context,
            serial,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn publish(&self, event: &Broadcast) -> FanoutReport {
        let payload = match JsonCodec::encode_broadcast(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(event = event.type_name(), error = %e, "broadcast not encodable");
                return FanoutReport::default();
            }
        };

        let mut report = FanoutReport::default();
        lock(&self.registry).retain(|context, slot| {
            match slot.sender.try_send(payload.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    report.dropped += 1;
                    debug!(context = %context.short_id(), event = event.type_name(), "subscriber queue full, event dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    report.dropped += 1;
                    debug!(context = %context.short_id(), event = event.type_name(), "subscriber gone, pruned");
                    false
                }
            }
        });
        debug!(
            event = event.type_name(),
            delivered = report.delivered,
            dropped = report.dropped,
            "broadcast published"
        );
        report
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(crate::GatewayConfig::default().broadcast_capacity)
    }
}

/// A context's receiving end of the fan-out. Dropping it unregisters the
/// context.
pub struct Subscription {
    context: ContextId,
    serial: u64,
    receiver: mpsc::Receiver<Bytes>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Wait for the next event. `None` once the broadcaster is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Broadcast> {
        while let Some(payload) = self.receiver.recv().await {
            if let Some(event) = self.decode(&payload) {
                return Some(event);
            }
        }
        None
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Broadcast> {
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => {
                    if let Some(event) = self.decode(&payload) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    fn decode(&self, payload: &[u8]) -> Option<Broadcast> {
        match JsonCodec::decode_broadcast(payload) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(context = %self.context.short_id(), error = %e, "undecodable broadcast skipped");
                None
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut slots = lock(&registry);
        if slots.get(&self.context).is_some_and(|slot| slot.serial == self.serial) {
            slots.remove(&self.context);
            debug!(context = %self.context.short_id(), "subscriber unregistered");
        }
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<ContextId, Slot>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
