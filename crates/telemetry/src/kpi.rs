//! Dashboard KPIs advanced by a clamped random walk.

use realtime::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::format::format_compact;

/// A bounded integer metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub value: i64,
    pub floor: i64,
    /// `None` for counters that may grow without limit.
    pub ceiling: Option<i64>,
    /// Largest step, in either direction, taken on one tick.
    pub granularity: u32,
}

impl Counter {
    #[must_use]
    pub const fn new(value: i64, floor: i64, ceiling: Option<i64>, granularity: u32) -> Self {
        Self { value, floor, ceiling, granularity }
    }

    /// Restricts `value` to `[floor, ceiling]`.
    #[must_use]
    pub fn clamp(&self, value: i64) -> i64 {
        let value = value.max(self.floor);
        self.ceiling.map_or(value, |ceiling| value.min(ceiling))
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.clamp(self.value) == self.value
    }

    /// One random step, clamped to the counter's bounds.
    #[must_use]
    pub fn step<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Self {
        let delta = rng.next_step(self.granularity);
        Self { value: self.clamp(self.value.saturating_add(delta)), ..*self }
    }
}

/// The metrics shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    ActiveRestaurants,
    DeliveriesInProgress,
    ActiveUsers,
    AvgDeliveryMinutes,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::ActiveRestaurants,
        Self::DeliveriesInProgress,
        Self::ActiveUsers,
        Self::AvgDeliveryMinutes,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ActiveRestaurants => "Active Restaurants",
            Self::DeliveriesInProgress => "Deliveries in Progress",
            Self::ActiveUsers => "Active Users",
            Self::AvgDeliveryMinutes => "Avg. Delivery Time",
        }
    }

    /// Value as the dashboard prints it, e.g. `12.5k` users or `24m`.
    #[must_use]
    pub fn display(self, value: i64) -> String {
        match self {
            Self::ActiveUsers => format_compact(value),
            Self::AvgDeliveryMinutes => format!("{value}m"),
            Self::ActiveRestaurants | Self::DeliveriesInProgress => value.to_string(),
        }
    }
}

/// Snapshot of all dashboard KPIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryState {
    pub active_restaurants: Counter,
    pub deliveries_in_progress: Counter,
    pub active_users: Counter,
    pub avg_delivery_minutes: Counter,
}

impl TelemetryState {
    /// Values shown when the dashboard first loads.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            active_restaurants: Counter::new(142, 130, None, 1),
            deliveries_in_progress: Counter::new(89, 50, None, 3),
            active_users: Counter::new(12_500, 12_000, None, 50),
            avg_delivery_minutes: Counter::new(24, 20, Some(35), 1),
        }
    }

    #[must_use]
    pub const fn counter(&self, metric: Metric) -> &Counter {
        match metric {
            Metric::ActiveRestaurants => &self.active_restaurants,
            Metric::DeliveriesInProgress => &self.deliveries_in_progress,
            Metric::ActiveUsers => &self.active_users,
            Metric::AvgDeliveryMinutes => &self.avg_delivery_minutes,
        }
    }

    /// Every metric with its counter, in dashboard order.
    pub fn counters(&self) -> impl Iterator<Item = (Metric, &Counter)> {
        Metric::ALL.into_iter().map(move |metric| (metric, self.counter(metric)))
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        self.counters().all(|(_, counter)| counter.in_bounds())
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Advances every counter by one independent, clamped random step.
#[must_use]
pub fn step<R: RandomSource + ?Sized>(state: &TelemetryState, rng: &mut R) -> TelemetryState {
    let next = TelemetryState {
        active_restaurants: state.active_restaurants.step(rng),
        deliveries_in_progress: state.deliveries_in_progress.step(rng),
        active_users: state.active_users.step(rng),
        avg_delivery_minutes: state.avg_delivery_minutes.step(rng),
    };
    trace!(
        gauge.active_restaurants = next.active_restaurants.value,
        gauge.deliveries_in_progress = next.deliveries_in_progress.value,
        gauge.active_users = next.active_users.value,
        gauge.avg_delivery_minutes = next.avg_delivery_minutes.value
    );
    next
}

/// Owns the KPI state and its random source; the only writer of the state.
#[derive(Debug, Clone)]
pub struct TelemetrySimulator<R> {
    state: TelemetryState,
    rng: R,
}

impl<R: RandomSource> TelemetrySimulator<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { state: TelemetryState::initial(), rng }
    }

    #[must_use]
    pub const fn state(&self) -> &TelemetryState {
        &self.state
    }

    /// Advances one tick and returns the new state.
    pub fn tick(&mut self) -> &TelemetryState {
        self.state = step(&self.state, &mut self.rng);
        &self.state
    }
}
