//! Intersection records and their signal state

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::types::{IntersectionId, SignalStatus};

/// An intersection in the road network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    /// Fixed at creation; the store keys its lookups on it
    id: IntersectionId,
    pub name: String,
    pub signal_status: SignalStatus,
    /// When the signal last changed
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_change: DateTime<Utc>,
    /// Position in the neighbor rotation when this intersection was handed the
    /// green by the round-robin controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_index: Option<usize>,
}

impl Intersection {
    /// New intersections start on red
    pub fn new(id: IntersectionId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            signal_status: SignalStatus::Red,
            last_change: now,
            rotation_index: None,
        }
    }

    pub fn id(&self) -> &IntersectionId {
        &self.id
    }

    /// Switch the signal and stamp the change time.
    /// Returns false if the signal already showed `status`.
    pub fn set_signal(&mut self, status: SignalStatus, now: DateTime<Utc>) -> bool {
        if self.signal_status == status {
            return false;
        }
        self.signal_status = status;
        self.last_change = now;
        true
    }

    /// How long the current signal has been showing
    pub fn held_for(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.last_change
    }
}
