//! Traffic signal controller
//!
//! Two interchangeable strategies share the `tick` entry point:
//!
//! - `DensityDriven` flips each intersection independently based on the
//!   average density of the roads arriving at it, only inside a short window
//!   at the start of every signal cycle. Red turns green above 0.5, green
//!   turns red below 0.3.
//! - `RoundRobin` keeps exactly one intersection green and, once it has been
//!   green for the dwell time, hands the green to one of its neighbors in turn.

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};

use super::road_network::RoadNetwork;
use super::types::{IntersectionId, SignalStatus};

/// Red intersections whose incoming density exceeds this turn green
pub const GREEN_DENSITY_THRESHOLD: f64 = 0.5;

/// Green intersections whose incoming density drops below this turn red
pub const RED_DENSITY_THRESHOLD: f64 = 0.3;

pub const DEFAULT_SIGNAL_CYCLE_SECS: i64 = 60;
pub const DEFAULT_SIGNAL_WINDOW_MS: i64 = 1000;
pub const DEFAULT_GREEN_DWELL_SECS: i64 = 10;

/// Signal scheduling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalController {
    DensityDriven {
        /// Length of a signal cycle
        cycle: TimeDelta,
        /// Evaluation only happens this close to the start of a cycle
        window: TimeDelta,
    },
    RoundRobin {
        /// Minimum time an intersection stays green
        dwell: TimeDelta,
    },
}

impl Default for SignalController {
    fn default() -> Self {
        Self::density_driven()
    }
}

/// A single signal flip made by a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalChange {
    pub intersection: IntersectionId,
    pub from: SignalStatus,
    pub to: SignalStatus,
}

/// Everything a tick changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalReport {
    pub changes: Vec<SignalChange>,
}

impl SignalReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl SignalController {
    pub fn density_driven() -> Self {
        SignalController::DensityDriven {
            cycle: TimeDelta::seconds(DEFAULT_SIGNAL_CYCLE_SECS),
            window: TimeDelta::milliseconds(DEFAULT_SIGNAL_WINDOW_MS),
        }
    }

    pub fn round_robin() -> Self {
        SignalController::RoundRobin {
            dwell: TimeDelta::seconds(DEFAULT_GREEN_DWELL_SECS),
        }
    }

    /// Advance the signal state machine to `now`
    pub fn tick(&self, network: &mut RoadNetwork, now: DateTime<Utc>) -> SignalReport {
        let report = match *self {
            SignalController::DensityDriven { cycle, window } => {
                tick_density_driven(network, now, cycle, window)
            }
            SignalController::RoundRobin { dwell } => tick_round_robin(network, now, dwell),
        };

        for change in &report.changes {
            debug!(
                "Signal at {} changed {} -> {}",
                change.intersection, change.from, change.to
            );
        }
        report
    }
}

/// Set a signal and record the flip in the report
fn switch_signal(
    network: &mut RoadNetwork,
    report: &mut SignalReport,
    id: &IntersectionId,
    to: SignalStatus,
    now: DateTime<Utc>,
) {
    let Some(intersection) = network.intersection_mut(id) else {
        return;
    };
    let from = intersection.signal_status;
    if intersection.set_signal(to, now) {
        report.changes.push(SignalChange {
            intersection: id.clone(),
            from,
            to,
        });
    }
}

fn tick_density_driven(
    network: &mut RoadNetwork,
    now: DateTime<Utc>,
    cycle: TimeDelta,
    window: TimeDelta,
) -> SignalReport {
    let mut report = SignalReport::default();
    let cycle_ms = cycle.num_milliseconds().max(1);
    let window_ms = window.num_milliseconds();

    let ids: Vec<IntersectionId> = network.intersection_ids().cloned().collect();
    for id in ids {
        let Some(intersection) = network.intersection(&id) else {
            continue;
        };

        let time_in_cycle = intersection
            .held_for(now)
            .num_milliseconds()
            .rem_euclid(cycle_ms);
        if time_in_cycle >= window_ms {
            continue;
        }

        let average_density = network.average_incoming_density(&id);
        let next = match intersection.signal_status {
            SignalStatus::Red if average_density > GREEN_DENSITY_THRESHOLD => SignalStatus::Green,
            SignalStatus::Green if average_density < RED_DENSITY_THRESHOLD => SignalStatus::Red,
            _ => continue,
        };

        switch_signal(network, &mut report, &id, next, now);
    }

    report
}

fn tick_round_robin(network: &mut RoadNetwork, now: DateTime<Utc>, dwell: TimeDelta) -> SignalReport {
    let mut report = SignalReport::default();

    let greens: Vec<IntersectionId> = network
        .intersections()
        .filter(|intersection| intersection.signal_status.is_green())
        .map(|intersection| intersection.id().clone())
        .collect();

    let Some(current) = greens.first().cloned() else {
        let first = network.intersection_ids().next().cloned();
        if let Some(first) = first {
            info!("No green signal, starting rotation at {}", first);
            switch_signal(network, &mut report, &first, SignalStatus::Green, now);
        }
        return report;
    };

    // Only one green at a time; keep the first one found
    for extra in greens.iter().skip(1) {
        switch_signal(network, &mut report, extra, SignalStatus::Red, now);
    }

    let Some((held_for, rotation_index)) = network
        .intersection(&current)
        .map(|intersection| (intersection.held_for(now), intersection.rotation_index))
    else {
        return report;
    };
    if held_for < dwell {
        return report;
    }

    let adjacent: Vec<IntersectionId> = network.adjacent_intersections(&current).into_iter().collect();
    if adjacent.is_empty() {
        return report;
    }

    let next_index = rotation_index.map_or(0, |index| index + 1) % adjacent.len();
    let next = &adjacent[next_index];

    switch_signal(network, &mut report, &current, SignalStatus::Red, now);
    switch_signal(network, &mut report, next, SignalStatus::Green, now);
    if let Some(intersection) = network.intersection_mut(next) {
        intersection.rotation_index = Some(next_index);
    }

    report
}
