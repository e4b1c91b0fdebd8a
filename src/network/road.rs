//! Directed road records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{clamp_density, IntersectionId, CONGESTION_FACTOR};

/// One direction of a road. Two-way roads are stored as a pair of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Road {
    pub distance: u32,
    pub traffic_density: f64,
    pub last_updated: DateTime<Utc>,
}

impl Road {
    pub fn new(distance: u32, now: DateTime<Utc>) -> Self {
        Self {
            distance,
            traffic_density: 0.0,
            last_updated: now,
        }
    }

    /// Set the density (clamped into [0, 1]) and refresh the timestamp
    pub fn set_density(&mut self, density: f64, now: DateTime<Utc>) {
        self.traffic_density = clamp_density(density);
        self.last_updated = now;
    }

    /// Distance inflated by congestion; used for path cost only
    pub fn effective_weight(&self) -> f64 {
        f64::from(self.distance) * (1.0 + CONGESTION_FACTOR * self.traffic_density)
    }
}

/// A road as seen from outside the store: endpoints plus the directed record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadRecord {
    pub from: IntersectionId,
    pub to: IntersectionId,
    pub distance: u32,
    pub traffic_density: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl RoadRecord {
    pub fn new(
        from: IntersectionId,
        to: IntersectionId,
        road: &Road,
    ) -> Self {
        Self {
            from,
            to,
            distance: road.distance,
            traffic_density: road.traffic_density,
            last_updated: road.last_updated,
        }
    }
}
