//! Core types for the road network
//!
//! Identifiers and the small value types shared by the store, the path finder
//! and the signal controller.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// A wrapper type for intersection IDs
///
/// Intersections are keyed by caller-chosen strings ("A", "5th-and-main", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntersectionId(pub String);

impl IntersectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for IntersectionId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IntersectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntersectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for IntersectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Signal shown by an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    #[default]
    Red,
    Yellow,
    Green,
}

impl SignalStatus {
    pub fn is_green(self) -> bool {
        self == SignalStatus::Green
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalStatus::Red => "red",
            SignalStatus::Yellow => "yellow",
            SignalStatus::Green => "green",
        };
        f.write_str(label)
    }
}

/// Congestion class of a road, used by route summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficLevel {
    Light,
    Moderate,
    Heavy,
}

impl TrafficLevel {
    /// Light below 0.3, Moderate below 0.7, Heavy otherwise
    pub fn from_density(density: f64) -> Self {
        if density < LIGHT_TRAFFIC_THRESHOLD {
            TrafficLevel::Light
        } else if density < HEAVY_TRAFFIC_THRESHOLD {
            TrafficLevel::Moderate
        } else {
            TrafficLevel::Heavy
        }
    }
}

impl fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrafficLevel::Light => "Light",
            TrafficLevel::Moderate => "Moderate",
            TrafficLevel::Heavy => "Heavy",
        };
        f.write_str(label)
    }
}

/// Densities below this are classified as light traffic
pub const LIGHT_TRAFFIC_THRESHOLD: f64 = 0.3;

/// Densities at or above this are classified as heavy traffic
pub const HEAVY_TRAFFIC_THRESHOLD: f64 = 0.7;

/// How much a fully congested road inflates its effective distance, on top of
/// the raw distance (density 1.0 => 3x).
pub const CONGESTION_FACTOR: f64 = 2.0;

/// Clamp a density into [0, 1]. NaN is treated as an empty road.
pub fn clamp_density(density: f64) -> f64 {
    if density.is_nan() {
        0.0
    } else {
        density.clamp(0.0, 1.0)
    }
}
