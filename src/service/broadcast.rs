//! Fan-out of snapshots to in-process subscribers

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use std::sync::{Arc, Mutex, PoisonError};

use crate::network::{NetworkSnapshot, SharedNetwork};

/// Pushes every published snapshot to all live subscribers.
/// Subscribers that dropped their receiver are pruned on the next publish.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBroadcaster {
    subscribers: Arc<Mutex<Vec<Sender<Arc<NetworkSnapshot>>>>>,
}

impl SnapshotBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it immediately receives the current state
    pub fn subscribe(&self, network: &SharedNetwork) -> Receiver<Arc<NetworkSnapshot>> {
        let (tx, rx) = unbounded();
        // The receiver is alive, so this cannot fail
        let _ = tx.send(Arc::new(network.snapshot()));

        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.push(tx);
        debug!("New snapshot subscriber ({} total)", subscribers.len());
        rx
    }

    /// Send `snapshot` to every subscriber, returning how many received it
    pub fn publish(&self, snapshot: NetworkSnapshot) -> usize {
        let snapshot = Arc::new(snapshot);
        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);

        subscribers.retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
