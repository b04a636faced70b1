use std::fmt;
use std::sync::Arc;

use realtime::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::path::{Path, Point};

/// Opaque vehicle identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Cycle timing of a vehicle along its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Time for one full traversal, strictly positive.
    pub cycle_duration_ms: i64,
    /// Absolute start of the first cycle; may be in the future.
    pub start_time_ms: i64,
}

impl Timing {
    #[must_use]
    pub const fn new(cycle_duration_ms: i64, start_time_ms: i64) -> Self {
        Self { cycle_duration_ms, start_time_ms }
    }

    /// # Errors
    ///
    /// Returns `InvalidDuration` for a zero or negative cycle.
    pub const fn validate(&self) -> Result<()> {
        if self.cycle_duration_ms <= 0 {
            return Err(Error::InvalidDuration(self.cycle_duration_ms));
        }
        Ok(())
    }
}

/// A vehicle travelling a shared, immutable path on a repeating cycle.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: VehicleId,
    path: Arc<Path>,
    timing: Timing,
}

impl Vehicle {
    /// # Errors
    ///
    /// Returns `InvalidDuration` when the cycle duration is not positive.
    pub fn new(id: impl Into<VehicleId>, path: impl Into<Arc<Path>>, timing: Timing) -> Result<Self> {
        timing.validate()?;
        Ok(Self { id: id.into(), path: path.into(), timing })
    }

    #[must_use]
    pub const fn id(&self) -> &VehicleId {
        &self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn timing(&self) -> Timing {
        self.timing
    }

    #[must_use]
    pub const fn cycle_duration_ms(&self) -> i64 {
        self.timing.cycle_duration_ms
    }

    #[must_use]
    pub const fn start_time_ms(&self) -> i64 {
        self.timing.start_time_ms
    }
}

/// Position and heading of a vehicle at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionSample {
    pub position: Point,
    pub heading_degrees: f64,
}
