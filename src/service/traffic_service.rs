//! Request-level facade over the shared network
//!
//! Validates inputs the way an API layer would, applies the change to the
//! network, then persists and broadcasts the new snapshot.

use crossbeam_channel::Receiver;
use log::{info, warn};
use std::sync::Arc;

use super::broadcast::SnapshotBroadcaster;
use super::persistence::SnapshotStore;
use crate::network::{
    Intersection, NetworkError, NetworkSnapshot, RoadRecord, RouteSummary, SharedNetwork,
    SignalStatus,
};

#[derive(Debug, Clone)]
pub struct TrafficService {
    network: SharedNetwork,
    broadcaster: SnapshotBroadcaster,
    store: Option<SnapshotStore>,
}

fn required(value: &str, message: &str) -> Result<(), NetworkError> {
    if value.trim().is_empty() {
        Err(NetworkError::invalid(message))
    } else {
        Ok(())
    }
}

impl TrafficService {
    pub fn new(
        network: SharedNetwork,
        broadcaster: SnapshotBroadcaster,
        store: Option<SnapshotStore>,
    ) -> Self {
        Self {
            network,
            broadcaster,
            store,
        }
    }

    pub fn network(&self) -> &SharedNetwork {
        &self.network
    }

    /// Save and broadcast a snapshot taken under the mutation's write lock
    fn commit(&self, snapshot: NetworkSnapshot) {
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&snapshot) {
                warn!("Failed to persist snapshot: {:#}", err);
            }
        }
        self.broadcaster.publish(snapshot);
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot()
    }

    /// Receive a snapshot now and after every change
    pub fn subscribe(&self) -> Receiver<Arc<NetworkSnapshot>> {
        self.broadcaster.subscribe(&self.network)
    }

    pub fn intersection(&self, id: &str) -> Result<Intersection, NetworkError> {
        self.network
            .read()
            .intersection(id)
            .cloned()
            .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))
    }

    pub fn add_intersection(&self, id: &str, name: &str) -> Result<Intersection, NetworkError> {
        required(id, "Both id and name are required")?;
        required(name, "Both id and name are required")?;

        let (intersection, snapshot) = {
            let mut network = self.network.write();
            network.add_intersection(id, name)?;
            let intersection = network
                .intersection(id)
                .cloned()
                .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))?;
            (intersection, network.export_snapshot())
        };

        info!("Intersection {} ({}) added", id, name);
        self.commit(snapshot);
        Ok(intersection)
    }

    /// Rename an intersection and/or override its signal
    pub fn update_intersection(
        &self,
        id: &str,
        name: Option<&str>,
        signal: Option<SignalStatus>,
    ) -> Result<Intersection, NetworkError> {
        let (intersection, snapshot) = {
            let mut network = self.network.write();
            let intersection = network
                .update_intersection(id, name.map(str::to_string), signal)?
                .clone();
            (intersection, network.export_snapshot())
        };

        self.commit(snapshot);
        Ok(intersection)
    }

    pub fn remove_intersection(&self, id: &str) -> Result<Intersection, NetworkError> {
        let (removed, snapshot) = {
            let mut network = self.network.write();
            let removed = network
                .remove_intersection(id)
                .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))?;
            (removed, network.export_snapshot())
        };

        info!("Intersection {} removed", id);
        self.commit(snapshot);
        Ok(removed)
    }

    pub fn add_road(&self, from: &str, to: &str, distance: f64) -> Result<RoadRecord, NetworkError> {
        required(from, "from, to, and distance are required")?;
        required(to, "from, to, and distance are required")?;
        if from == to {
            return Err(NetworkError::invalid(
                "Cannot create a road from an intersection to itself",
            ));
        }
        if distance.is_nan() || distance <= 0.0 {
            return Err(NetworkError::invalid("Distance must be greater than 0"));
        }

        let (record, snapshot) = {
            let mut network = self.network.write();
            network.add_road(from, to, distance)?;
            let record = network
                .road(from, to)
                .map(|road| RoadRecord::new(from.into(), to.into(), road))
                .ok_or_else(|| NetworkError::RoadNotFound {
                    from: from.into(),
                    to: to.into(),
                })?;
            (record, network.export_snapshot())
        };

        info!("Road {} <-> {} added", from, to);
        self.commit(snapshot);
        Ok(record)
    }

    pub fn remove_road(&self, from: &str, to: &str) -> Result<(), NetworkError> {
        required(from, "Both from and to are required")?;
        required(to, "Both from and to are required")?;

        let snapshot = {
            let mut network = self.network.write();
            network.remove_road(from, to)?;
            network.export_snapshot()
        };

        info!("Road {} <-> {} removed", from, to);
        self.commit(snapshot);
        Ok(())
    }

    /// Set the density of a road (both directions). Unlike the store, which
    /// clamps, out-of-range values are rejected here.
    pub fn update_traffic(&self, from: &str, to: &str, density: f64) -> Result<(), NetworkError> {
        if !(0.0..=1.0).contains(&density) {
            return Err(NetworkError::invalid(
                "Density must be a number between 0 and 1",
            ));
        }

        let snapshot = {
            let mut network = self.network.write();
            network.update_traffic_density(from, to, density)?;
            network.export_snapshot()
        };

        self.commit(snapshot);
        Ok(())
    }

    /// The directed road record from `from` to `to`
    pub fn road(&self, from: &str, to: &str) -> Result<RoadRecord, NetworkError> {
        self.network
            .read()
            .road(from, to)
            .map(|road| RoadRecord::new(from.into(), to.into(), road))
            .ok_or_else(|| NetworkError::RoadNotFound {
                from: from.into(),
                to: to.into(),
            })
    }

    /// Roads leaving an intersection
    pub fn roads_at(&self, id: &str) -> Result<Vec<RoadRecord>, NetworkError> {
        self.network
            .read()
            .connected_roads(id)
            .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))
    }

    pub fn route(&self, from: &str, to: &str) -> Result<RouteSummary, NetworkError> {
        required(from, "Both from and to parameters are required")?;
        required(to, "Both from and to parameters are required")?;

        self.network.read().route_summary(from, to)
    }
}
