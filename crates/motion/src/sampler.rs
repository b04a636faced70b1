//! Time to position/heading for a single vehicle.
//!
//! Sampling is a pure function of the vehicle and the query time; no state
//! is kept between calls.

use tracing::trace;

use crate::geometry::{self, bearing};
use crate::path::Path;
use crate::vehicle::{MotionSample, Vehicle};

/// Fraction of the current cycle completed at `now_ms`, in `[0, 1)`.
///
/// Times before the vehicle's start wrap into the cycle as well, so a
/// vehicle that has not started yet still has a well-defined position.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress(vehicle: &Vehicle, now_ms: i64) -> f64 {
    let cycle = vehicle.cycle_duration_ms().max(1);
    let elapsed = now_ms.saturating_sub(vehicle.start_time_ms()).rem_euclid(cycle);
    elapsed as f64 / cycle as f64
}

/// Position and heading of `vehicle` at `now_ms`.
///
/// Returns `None` for a path that cannot be traversed; the vehicle simply
/// has no position this frame.
#[must_use]
pub fn sample(vehicle: &Vehicle, now_ms: i64) -> Option<MotionSample> {
    let path = vehicle.path();
    let length = match path.length() {
        Ok(length) => length,
        Err(err) => {
            trace!(vehicle = %vehicle.id(), error = %err, "vehicle not sampled");
            return None;
        }
    };

    let target = progress(vehicle, now_ms) * length;
    let segment = geometry::segment_at_distance(path, target).ok()?;

    Some(MotionSample {
        position: segment.point(),
        heading_degrees: heading(path, segment.index),
    })
}

// Bearing of the segment at `index`, falling back to the closest earlier
// segment with distinct end points, then to north.
fn heading(path: &Path, index: usize) -> f64 {
    let points = path.points();
    let end = (index + 2).min(points.len());
    points[..end].windows(2).rev().find_map(|pair| bearing(pair[0], pair[1])).unwrap_or(0.0)
}
