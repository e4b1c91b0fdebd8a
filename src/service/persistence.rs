//! Saving and loading network snapshots as JSON

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::network::{NetworkSnapshot, RoadNetwork};

/// A JSON file holding the latest snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the file with `snapshot`
    pub fn save(&self, snapshot: &NetworkSnapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write snapshot to {}", self.path.display()))
    }

    /// Read the saved snapshot. A missing file is not an error.
    pub fn load(&self) -> Result<Option<NetworkSnapshot>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };

        let snapshot = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt snapshot in {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    /// Load the saved snapshot and replay it into a fresh network
    pub fn load_network(&self) -> Result<Option<RoadNetwork>> {
        let Some(snapshot) = self.load()? else {
            return Ok(None);
        };

        let network = RoadNetwork::from_snapshot(&snapshot);
        info!(
            "Loaded {} intersections and {} roads from {}",
            network.intersection_count(),
            network.road_count(),
            self.path.display()
        );
        Ok(Some(network))
    }
}
