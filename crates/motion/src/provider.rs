//! # Provider
//!
//! Route geometry comes from an external routing provider.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::path::Point;
use crate::vehicle::{Timing, VehicleId};

/// Source of routable paths between two end points.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Ordered coordinates of a route from `from` to `to`.
    async fn route(&self, from: Point, to: Point) -> Result<Vec<Point>>;
}

/// A delivery to be driven by one vehicle once its route is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub vehicle_id: VehicleId,
    pub from: Point,
    pub to: Point,
    pub timing: Timing,
}
