//! Road network engine
//!
//! The in-memory graph of intersections and roads, the congestion-aware path
//! finder, the signal controller and the snapshot exporter. Nothing in here
//! does I/O; see `service` for persistence, broadcast and the simulation loop.

mod error;
mod intersection;
mod path_finder;
mod road;
mod road_network;
mod route;
mod sample;
mod shared;
mod signals;
mod snapshot;
mod types;

pub use error::NetworkError;
pub use intersection::Intersection;
pub use road::{Road, RoadRecord};
pub use road_network::RoadNetwork;
pub use route::{RouteSegment, RouteSummary};
pub use sample::sample_network;
pub use shared::SharedNetwork;
pub use signals::{
    SignalChange, SignalController, SignalReport, DEFAULT_GREEN_DWELL_SECS,
    DEFAULT_SIGNAL_CYCLE_SECS, DEFAULT_SIGNAL_WINDOW_MS, GREEN_DENSITY_THRESHOLD,
    RED_DENSITY_THRESHOLD,
};
pub use snapshot::NetworkSnapshot;
pub use types::{
    clamp_density, IntersectionId, SignalStatus, TrafficLevel, CONGESTION_FACTOR,
    HEAVY_TRAFFIC_THRESHOLD, LIGHT_TRAFFIC_THRESHOLD,
};
