//! Sample network used when no saved state exists

use chrono::Utc;
use log::warn;

use super::road_network::RoadNetwork;
use super::types::SignalStatus;

/// Four districts joined by five roads:
///
/// ```text
///   A --2-- B --4-- D
///    \      |      /
///     5     3     2
///      \    |    /
///       ---- C --
/// ```
pub fn sample_network() -> RoadNetwork {
    let mut network = RoadNetwork::new();

    for (id, name) in [
        ("A", "Downtown"),
        ("B", "Midtown"),
        ("C", "Uptown"),
        ("D", "Suburb"),
    ] {
        if let Err(err) = network.add_intersection(id, name) {
            warn!("Skipping sample intersection {}: {}", id, err);
        }
    }

    for (from, to, distance) in [
        ("A", "B", 2.0),
        ("B", "C", 3.0),
        ("A", "C", 5.0),
        ("B", "D", 4.0),
        ("C", "D", 2.0),
    ] {
        if let Err(err) = network.add_road(from, to, distance) {
            warn!("Skipping sample road {} <-> {}: {}", from, to, err);
        }
    }

    let now = Utc::now();
    for id in ["A", "C"] {
        if let Some(intersection) = network.intersection_mut(id) {
            intersection.set_signal(SignalStatus::Green, now);
        }
    }

    network
}
