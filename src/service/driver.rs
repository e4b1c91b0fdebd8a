//! Periodic simulation loop
//!
//! Every step nudges the density of a random subset of roads, advances the
//! signal controller, then saves and broadcasts the resulting snapshot.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::ops::RangeInclusive;
use std::time::Duration;

use super::broadcast::SnapshotBroadcaster;
use super::persistence::SnapshotStore;
use crate::config::SimulationConfig;
use crate::network::{RoadNetwork, SharedNetwork, SignalController, SignalReport};

/// What a single simulation step did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSummary {
    /// Two-way roads whose density was changed
    pub roads_perturbed: usize,
    pub signals: SignalReport,
    /// Subscribers that received the post-step snapshot
    pub delivered: usize,
}

pub struct SimulationDriver {
    network: SharedNetwork,
    controller: SignalController,
    broadcaster: SnapshotBroadcaster,
    store: Option<SnapshotStore>,
    tick_interval: Duration,
    jitter_probability: f64,
    max_jitter: f64,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    /// Steps taken so far
    steps: u64,
}

impl SimulationDriver {
    pub fn new(
        network: SharedNetwork,
        config: &SimulationConfig,
        broadcaster: SnapshotBroadcaster,
    ) -> Self {
        Self {
            network,
            controller: config.signal_controller(),
            broadcaster,
            store: config.data_file.clone().map(SnapshotStore::new),
            tick_interval: config.tick_interval,
            jitter_probability: config.jitter_probability.clamp(0.0, 1.0),
            max_jitter: config.max_jitter.abs(),
            rng: config.seed.map(StdRng::seed_from_u64),
            steps: 0,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Get a uniform value in [0, 1), using seeded RNG if available
    fn random_unit(&mut self) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random(),
            None => rand::rng().random(),
        }
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: RangeInclusive<f64>) -> f64 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Nudge a random subset of roads; returns how many changed
    fn perturb_densities(&mut self, network: &mut RoadNetwork) -> usize {
        let roads = network.export_snapshot().roads;
        let mut perturbed = 0;

        for road in roads {
            if self.random_unit() >= self.jitter_probability {
                continue;
            }
            let delta = self.random_range(-self.max_jitter..=self.max_jitter);
            // Clamped into [0, 1] by the store
            if network
                .update_traffic_density(&road.from, &road.to, road.traffic_density + delta)
                .is_ok()
            {
                perturbed += 1;
            }
        }

        perturbed
    }

    /// Run one simulation step at time `now`
    pub fn step(&mut self, now: DateTime<Utc>) -> StepSummary {
        let network = self.network.clone();

        // Mutate and snapshot under one write lock so observers never see a
        // half-applied step
        let (roads_perturbed, signals, snapshot) = {
            let mut guard = network.write();
            let roads_perturbed = self.perturb_densities(&mut guard);
            let signals = self.controller.tick(&mut guard, now);
            (roads_perturbed, signals, guard.export_snapshot())
        };

        self.steps += 1;
        debug!(
            "Step {}: {} roads perturbed, {} signal changes",
            self.steps,
            roads_perturbed,
            signals.changes.len()
        );

        if let Some(store) = &self.store {
            if let Err(err) = store.save(&snapshot) {
                warn!("Failed to persist snapshot: {:#}", err);
            }
        }
        let delivered = self.broadcaster.publish(snapshot);

        StepSummary {
            roads_perturbed,
            signals,
            delivered,
        }
    }

    /// Step on a fixed interval. Runs `steps` times, or forever if None.
    /// `on_step` sees the driver and the summary after every step.
    pub fn run(&mut self, steps: Option<u64>, mut on_step: impl FnMut(&Self, &StepSummary)) {
        info!(
            "Running simulation every {:?} with {:?} signals",
            self.tick_interval, self.controller
        );

        let mut remaining = steps;
        while remaining != Some(0) {
            std::thread::sleep(self.tick_interval);
            let summary = self.step(Utc::now());
            on_step(self, &summary);
            remaining = remaining.map(|left| left - 1);
        }

        info!("Simulation stopped after {} steps", self.steps);
    }
}
