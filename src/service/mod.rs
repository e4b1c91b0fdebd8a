//! Collaborators around the road network engine
//!
//! Persistence to a JSON file, snapshot broadcast, the periodic simulation
//! driver and the request-level service facade.

mod broadcast;
mod driver;
mod persistence;
mod traffic_service;

pub use broadcast::SnapshotBroadcaster;
pub use driver::{SimulationDriver, StepSummary};
pub use persistence::SnapshotStore;
pub use traffic_service::TrafficService;
