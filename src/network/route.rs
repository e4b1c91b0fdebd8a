//! Route summaries built on top of shortest paths

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::NetworkError;
use super::road_network::RoadNetwork;
use super::types::{IntersectionId, SignalStatus, TrafficLevel};

/// One hop of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub from: IntersectionId,
    pub to: IntersectionId,
    pub distance: u32,
    pub traffic_density: f64,
    pub traffic_status: TrafficLevel,
    /// Signal currently shown at the end of this segment
    pub signal_status: SignalStatus,
}

/// A computed route with its per-segment breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub from: IntersectionId,
    pub to: IntersectionId,
    pub path: Vec<IntersectionId>,
    /// Sum of raw segment distances, not the congestion-weighted cost
    pub total_distance: u64,
    pub segments: Vec<RouteSegment>,
    pub timestamp: DateTime<Utc>,
}

impl RoadNetwork {
    /// Finds the shortest path and describes each segment along it
    pub fn route_summary(&self, from: &str, to: &str) -> Result<RouteSummary, NetworkError> {
        for endpoint in [from, to] {
            if !self.contains(endpoint) {
                return Err(NetworkError::IntersectionNotFound(endpoint.into()));
            }
        }

        let path = self
            .shortest_path(from, to)
            .ok_or_else(|| NetworkError::Unreachable {
                from: from.into(),
                to: to.into(),
            })?;

        let segments: Vec<RouteSegment> = path
            .windows(2)
            .filter_map(|hop| {
                let road = self.road(&hop[0], &hop[1])?;
                let signal_status = self.intersection(&hop[1])?.signal_status;
                Some(RouteSegment {
                    from: hop[0].clone(),
                    to: hop[1].clone(),
                    distance: road.distance,
                    traffic_density: road.traffic_density,
                    traffic_status: TrafficLevel::from_density(road.traffic_density),
                    signal_status,
                })
            })
            .collect();

        let total_distance = segments
            .iter()
            .map(|segment| u64::from(segment.distance))
            .sum();

        Ok(RouteSummary {
            from: from.into(),
            to: to.into(),
            path,
            total_distance,
            segments,
            timestamp: Utc::now(),
        })
    }
}
