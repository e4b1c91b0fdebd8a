//! Thread-safe handle to the single road network instance

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::road_network::RoadNetwork;
use super::snapshot::NetworkSnapshot;

/// Cloneable handle shared by every collaborator.
///
/// Mutations take the write lock, so at most one runs at a time. Snapshots and
/// path queries hold the read lock for their whole duration and therefore see
/// a consistent view.
#[derive(Debug, Clone, Default)]
pub struct SharedNetwork {
    inner: Arc<RwLock<RoadNetwork>>,
}

impl SharedNetwork {
    pub fn new(network: RoadNetwork) -> Self {
        Self {
            inner: Arc::new(RwLock::new(network)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, RoadNetwork> {
        // Every store operation leaves the graph consistent before returning,
        // so a poisoned lock still guards valid data
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, RoadNetwork> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.read().export_snapshot()
    }
}
