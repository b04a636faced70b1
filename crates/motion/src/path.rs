//! Waypoints and routes in longitude/latitude degree space.

use std::fmt;

use realtime::{Result, invalid_path};
use serde::{Deserialize, Serialize};

use crate::geometry;

/// A `(longitude, latitude)` pair in decimal degrees.
///
/// Serializes as a GeoJSON-style `[lng, lat]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    lng: f64,
    lat: f64,
}

impl Point {
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }
}

impl From<[f64; 2]> for Point {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.lng, point.lat]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}, {:.6}]", self.lng, self.lat)
    }
}

/// An ordered waypoint sequence with its planar arc length cached.
///
/// The cached length is only recomputed when the points change. Paths with
/// fewer than two points can be built but are never valid for motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Point>", into = "Vec<Point>")]
pub struct Path {
    points: Vec<Point>,
    length: f64,
}

impl Path {
    #[must_use]
    pub fn new(points: impl Into<Vec<Point>>) -> Self {
        let points = points.into();
        let length = measure(&points);
        Self { points, length }
    }

    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// A path needs at least two points to be traversed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    /// Total planar length in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`realtime::Error::InvalidPath`] when the path has fewer than
    /// two points.
    pub fn length(&self) -> Result<f64> {
        if !self.is_valid() {
            return Err(invalid_path!("path has {} point(s), need at least 2", self.points.len()));
        }
        Ok(self.length)
    }

    #[must_use]
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Consecutive point pairs in travel order.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
        self.length = measure(&self.points);
    }

    pub fn replace_points(&mut self, points: impl Into<Vec<Point>>) {
        self.points = points.into();
        self.length = measure(&self.points);
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl From<Path> for Vec<Point> {
    fn from(path: Path) -> Self {
        path.points
    }
}

impl FromIterator<Point> for Path {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

fn measure(points: &[Point]) -> f64 {
    geometry::length(points).unwrap_or(0.0)
}
