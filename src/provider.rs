//! # Provider
//!
//! Synthetic delivery missions and the route provider that serves them. Routes
//! are straight two-point lines between a restaurant hub and a random drop-off
//! near the city centre.

use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use motion::{Mission, Point, RouteProvider, Timing, VehicleId};
use realtime::RandomSource;
use serde::Serialize;

/// A restaurant hub deliveries start from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hub {
    pub name: &'static str,
    pub location: Point,
}

pub const HUBS: [Hub; 4] = [
    Hub { name: "Downtown Hub", location: Point::new(-84.3880, 33.7490) },
    Hub { name: "Midtown Eats", location: Point::new(-84.3963, 33.7748) },
    Hub { name: "Edgewood Kitchen", location: Point::new(-84.3730, 33.7537) },
    Hub { name: "Westside Provisions", location: Point::new(-84.4260, 33.7915) },
];

/// Congestion on a route, bucketed from a level in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Traffic {
    Low,
    Moderate,
    Heavy,
}

impl Traffic {
    #[must_use]
    pub fn classify(level: f64) -> Self {
        if level < 1.0 / 3.0 {
            Self::Low
        } else if level < 2.0 / 3.0 {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }
}

/// A planned delivery: the mission to dispatch and the traffic on its route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub mission: Mission,
    pub hub: &'static str,
    pub traffic_level: f64,
    pub traffic: Traffic,
}

/// Parameters for [`plan_deliveries`].
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub count: usize,
    pub center: Point,
    pub spread: f64,
    pub cycle_duration_ms: i64,
    pub now_ms: i64,
}

/// Plans `count` deliveries, cycling through the hubs. Drop-offs fall within
/// `spread / 2` degrees of the centre on each axis.
///
/// Start times are staggered over one cycle so the fleet is spread along its
/// routes rather than leaving every hub at once.
pub fn plan_deliveries<R: RandomSource + ?Sized>(plan: &Plan, rng: &mut R) -> Vec<Delivery> {
    let count = i64::try_from(plan.count).unwrap_or(i64::MAX);

    let mut deliveries = Vec::with_capacity(plan.count);
    for (index, hub) in (0_i64..count).zip(HUBS.iter().cycle()) {
        let lng = plan.center.lng() + (rng.next_f64() - 0.5) * plan.spread;
        let lat = plan.center.lat() + (rng.next_f64() - 0.5) * plan.spread;
        let to = Point::new(lng, lat);
        let traffic_level = rng.next_f64();
        let offset = plan.cycle_duration_ms.saturating_mul(index) / count;

        let mission = Mission {
            vehicle_id: VehicleId::from(format!("courier-{:02}", index + 1)),
            from: hub.location,
            to,
            timing: Timing::new(plan.cycle_duration_ms, plan.now_ms - offset),
        };
        deliveries.push(Delivery {
            mission,
            hub: hub.name,
            traffic_level,
            traffic: Traffic::classify(traffic_level),
        });
    }
    deliveries
}

/// Route provider returning straight lines, optionally after a simulated
/// network delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticRoutes {
    latency: Option<Duration>,
}

impl SyntheticRoutes {
    #[must_use]
    pub const fn new() -> Self {
        Self { latency: None }
    }

    #[must_use]
    pub const fn with_latency(latency: Duration) -> Self {
        Self { latency: Some(latency) }
    }
}

#[async_trait]
impl RouteProvider for SyntheticRoutes {
    async fn route(&self, from: Point, to: Point) -> Result<Vec<Point>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let finite = |p: Point| p.lng().is_finite() && p.lat().is_finite();
        if !finite(from) || !finite(to) {
            bail!("cannot route between {from} and {to}");
        }
        Ok(vec![from, to])
    }
}
