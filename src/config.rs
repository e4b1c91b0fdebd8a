//! Runtime configuration for the simulation service

use chrono::TimeDelta;
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

use crate::network::{
    SignalController, DEFAULT_GREEN_DWELL_SECS, DEFAULT_SIGNAL_CYCLE_SECS,
    DEFAULT_SIGNAL_WINDOW_MS,
};

/// Default time between simulation steps
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 5000;

/// Chance that any given road has its density nudged in a step
pub const DEFAULT_JITTER_PROBABILITY: f64 = 0.3;

/// Largest density change applied to a road in one step
pub const DEFAULT_MAX_JITTER: f64 = 0.1;

pub const DEFAULT_DATA_FILE: &str = "db.json";

/// Which signal strategy drives the intersections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SignalMode {
    /// Each intersection reacts to the congestion arriving at it
    #[default]
    Density,
    /// A single green rotates between neighboring intersections
    RoundRobin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub tick_interval: Duration,
    pub jitter_probability: f64,
    pub max_jitter: f64,
    pub signal_mode: SignalMode,
    pub signal_cycle: TimeDelta,
    pub signal_window: TimeDelta,
    pub green_dwell: TimeDelta,
    /// Seed for reproducible density jitter
    pub seed: Option<u64>,
    /// Where snapshots are saved; None disables persistence
    pub data_file: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            jitter_probability: DEFAULT_JITTER_PROBABILITY,
            max_jitter: DEFAULT_MAX_JITTER,
            signal_mode: SignalMode::default(),
            signal_cycle: TimeDelta::seconds(DEFAULT_SIGNAL_CYCLE_SECS),
            signal_window: TimeDelta::milliseconds(DEFAULT_SIGNAL_WINDOW_MS),
            green_dwell: TimeDelta::seconds(DEFAULT_GREEN_DWELL_SECS),
            seed: None,
            data_file: Some(PathBuf::from(DEFAULT_DATA_FILE)),
        }
    }
}

impl SimulationConfig {
    /// Build the signal controller selected by `signal_mode`
    pub fn signal_controller(&self) -> SignalController {
        match self.signal_mode {
            SignalMode::Density => SignalController::DensityDriven {
                cycle: self.signal_cycle,
                window: self.signal_window,
            },
            SignalMode::RoundRobin => SignalController::RoundRobin {
                dwell: self.green_dwell,
            },
        }
    }
}
