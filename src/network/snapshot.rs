//! Serializable point-in-time view of the network
//!
//! Snapshots list every intersection and every two-way road once. They are the
//! shape written to disk and pushed to subscribers, and can be replayed to
//! rebuild a network.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::intersection::Intersection;
use super::road::RoadRecord;
use super::road_network::RoadNetwork;
use super::types::IntersectionId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub intersections: Vec<Intersection>,
    /// One entry per two-way road. The from/to orientation is whichever
    /// direction was enumerated first and carries no meaning.
    pub roads: Vec<RoadRecord>,
}

impl NetworkSnapshot {
    /// Whether the snapshot contains a road between `a` and `b`, in either orientation
    pub fn has_road_between(&self, a: &str, b: &str) -> bool {
        self.roads.iter().any(|road| {
            (road.from.as_str() == a && road.to.as_str() == b)
                || (road.from.as_str() == b && road.to.as_str() == a)
        })
    }
}

/// Order-independent key for the road between two intersections
fn pair_key(a: IntersectionId, b: IntersectionId) -> (IntersectionId, IntersectionId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl RoadNetwork {
    /// Builds a deduplicated snapshot of the current state
    pub fn export_snapshot(&self) -> NetworkSnapshot {
        let intersections = self.intersections().cloned().collect();

        let mut seen = HashSet::new();
        let roads = self
            .directed_roads()
            .filter(|road| seen.insert(pair_key(road.from.clone(), road.to.clone())))
            .collect();

        NetworkSnapshot {
            intersections,
            roads,
        }
    }

    /// Rebuilds a network by replaying a snapshot through the normal mutation
    /// operations, then restoring each intersection's persisted signal state.
    ///
    /// Entries that fail to replay (duplicate ids, roads to unknown
    /// intersections, ...) are skipped with a warning.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        let mut network = RoadNetwork::new();

        for persisted in &snapshot.intersections {
            if let Err(err) = network.add_intersection(persisted.id().clone(), persisted.name.clone()) {
                warn!("Skipping intersection {} from snapshot: {}", persisted.id(), err);
                continue;
            }
            if let Some(intersection) = network.intersection_mut(persisted.id()) {
                intersection.signal_status = persisted.signal_status;
                intersection.last_change = persisted.last_change;
                intersection.rotation_index = persisted.rotation_index;
            }
        }

        for road in &snapshot.roads {
            let replayed = network
                .add_road(&road.from, &road.to, f64::from(road.distance))
                .and_then(|_| network.update_traffic_density(&road.from, &road.to, road.traffic_density));
            if let Err(err) = replayed {
                warn!("Skipping road {} <-> {} from snapshot: {}", road.from, road.to, err);
            }
        }

        network
    }
}
