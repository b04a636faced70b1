//! Pure geometry over waypoint sequences.
//!
//! Distances are planar Euclidean distances in raw degree space, not
//! geodesic distances. Bearings use the great-circle initial bearing formula.

use realtime::{Result, invalid_path};
use serde::Serialize;

use crate::path::{Path, Point};

/// Planar distance between two points, in degrees.
#[must_use]
pub fn distance(from: Point, to: Point) -> f64 {
    let dx = to.lng() - from.lng();
    let dy = to.lat() - from.lat();
    (dx * dx + dy * dy).sqrt()
}

/// Sum of distances between consecutive points.
///
/// # Errors
///
/// Returns `InvalidPath` when fewer than two points are supplied.
pub fn length(points: &[Point]) -> Result<f64> {
    if points.len() < 2 {
        return Err(invalid_path!("path has {} point(s), need at least 2", points.len()));
    }
    Ok(points.windows(2).map(|pair| distance(pair[0], pair[1])).sum())
}

/// Linear interpolation between two points, `fraction` in `[0, 1]`.
#[must_use]
pub fn interpolate(from: Point, to: Point, fraction: f64) -> Point {
    Point::new(
        from.lng() + (to.lng() - from.lng()) * fraction,
        from.lat() + (to.lat() - from.lat()) * fraction,
    )
}

/// The segment of a path that contains a given arc length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Index of the segment, `0` for the first pair of points.
    pub index: usize,
    pub from: Point,
    pub to: Point,
    /// Position within the segment in `[0, 1]`.
    pub fraction: f64,
}

impl Segment {
    /// The point at `fraction` along the segment. The end points are returned
    /// exactly rather than interpolated.
    #[must_use]
    pub fn point(&self) -> Point {
        if self.fraction <= 0.0 {
            self.from
        } else if self.fraction >= 1.0 {
            self.to
        } else {
            interpolate(self.from, self.to, self.fraction)
        }
    }
}

/// Locates the segment containing `target` arc length.
///
/// Segment `i` covers `[start_i, start_i + len_i)`, so a target that lands
/// exactly on an interior waypoint belongs to the following segment. Targets
/// outside the path are clamped to its ends.
///
/// # Errors
///
/// Returns `InvalidPath` when the path has fewer than two points.
pub fn segment_at_distance(path: &Path, target: f64) -> Result<Segment> {
    let total = path.length()?;
    let points = path.points();
    let last = points.len() - 2;

    if target <= 0.0 || target.is_nan() {
        return Ok(Segment { index: 0, from: points[0], to: points[1], fraction: 0.0 });
    }
    let end = Segment { index: last, from: points[last], to: points[last + 1], fraction: 1.0 };
    if target >= total {
        return Ok(end);
    }

    let mut travelled = 0.0;
    for (index, (from, to)) in path.segments().enumerate() {
        let span = distance(from, to);
        if target < travelled + span {
            let fraction = if span > 0.0 { (target - travelled) / span } else { 0.0 };
            return Ok(Segment { index, from, to, fraction });
        }
        travelled += span;
    }

    // rounding left the target just short of the cached total
    Ok(end)
}

/// The point at `target` arc length along the path, clamped to its ends.
///
/// # Errors
///
/// Returns `InvalidPath` when the path has fewer than two points.
pub fn point_at_distance(path: &Path, target: f64) -> Result<Point> {
    segment_at_distance(path, target).map(|segment| segment.point())
}

/// Initial compass bearing from `from` toward `to`, in degrees `[0, 360)`.
///
/// Returns `None` when the points coincide; callers substitute the last known
/// bearing.
#[must_use]
pub fn bearing(from: Point, to: Point) -> Option<f64> {
    if from == to {
        return None;
    }

    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();
    let delta_lng = (to.lng() - from.lng()).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    Some(if degrees >= 360.0 { 0.0 } else { degrees })
}
