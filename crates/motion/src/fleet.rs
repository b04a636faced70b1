//! The set of vehicles currently on the map.
//!
//! Vehicles whose route is still being fetched sit in a pending slot: their id
//! is reserved but they are not sampled. A failed fetch releases the slot
//! without touching any other vehicle.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use realtime::{Error, Result, duplicate_vehicle, invalid_path, not_found};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::path::Path;
use crate::provider::{Mission, RouteProvider};
use crate::sampler;
use crate::vehicle::{MotionSample, Timing, Vehicle, VehicleId};

/// Positions of every sampled vehicle, ordered by id.
pub type Snapshot = BTreeMap<VehicleId, MotionSample>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleStatus {
    /// Route requested, geometry not yet available.
    Pending,
    Active,
}

#[derive(Debug)]
enum Slot {
    Pending,
    Active(Vehicle),
}

/// Outcome of [`FleetController::dispatch`].
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub assigned: Vec<VehicleId>,
    pub failed: Vec<(VehicleId, Error)>,
}

/// Owns the fleet and produces per-frame snapshots.
#[derive(Debug, Default)]
pub struct FleetController {
    slots: BTreeMap<VehicleId, Slot>,
}

impl FleetController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vehicle with a known path.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateVehicle` when the id is active or pending,
    /// `InvalidPath` for a path with fewer than two points, and
    /// `InvalidDuration` for a non-positive cycle.
    pub fn assign(
        &mut self, id: impl Into<VehicleId>, path: impl Into<Arc<Path>>, cycle_duration_ms: i64,
        start_time_ms: i64,
    ) -> Result<()> {
        let id = id.into();
        if self.slots.contains_key(&id) {
            return Err(duplicate_vehicle!("vehicle {} is already assigned", id));
        }
        self.activate(id, path.into(), Timing::new(cycle_duration_ms, start_time_ms))
    }

    /// Reserves an id while its route is fetched.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateVehicle` when the id is active or pending.
    pub fn mark_pending(&mut self, id: impl Into<VehicleId>) -> Result<()> {
        let id = id.into();
        if self.slots.contains_key(&id) {
            return Err(duplicate_vehicle!("vehicle {} is already assigned", id));
        }
        debug!(vehicle = %id, "route pending");
        self.slots.insert(id, Slot::Pending);
        Ok(())
    }

    /// Completes a pending assignment with the outcome of its route fetch.
    ///
    /// On failure the pending slot is released and the error returned; other
    /// vehicles are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `RouteFetch` when `route` is an error, `NotFound` when the id
    /// is not pending (e.g. removed while fetching), `DuplicateVehicle` when
    /// it is already active, plus any error from [`Self::assign`].
    pub fn resolve(
        &mut self, id: impl Into<VehicleId>, route: anyhow::Result<Path>, timing: Timing,
    ) -> Result<()> {
        let id = id.into();
        match self.slots.get(&id) {
            Some(Slot::Pending) => {}
            Some(Slot::Active(_)) => {
                return Err(duplicate_vehicle!("vehicle {} is already active", id));
            }
            None => return Err(not_found!("vehicle {} is not awaiting a route", id)),
        }
        self.slots.remove(&id);

        match route {
            Ok(path) => self.activate(id, Arc::new(path), timing),
            Err(err) => {
                let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");
                warn!(
                    monotonic_counter.route_fetch_failures = 1,
                    vehicle = %id,
                    error = %chain,
                    "route fetch failed, vehicle dropped"
                );
                Err(Error::RouteFetch(format!("vehicle {id}: {chain}")))
            }
        }
    }

    /// Unregisters a vehicle, active or pending. Returns whether it existed.
    pub fn remove(&mut self, id: &VehicleId) -> bool {
        let removed = self.slots.remove(id).is_some();
        if removed {
            info!(monotonic_counter.vehicles_removed = 1, vehicle = %id);
        }
        removed
    }

    #[must_use]
    pub fn status(&self, id: &VehicleId) -> Option<VehicleStatus> {
        self.slots.get(id).map(|slot| match slot {
            Slot::Pending => VehicleStatus::Pending,
            Slot::Active(_) => VehicleStatus::Active,
        })
    }

    #[must_use]
    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        match self.slots.get(id) {
            Some(Slot::Active(vehicle)) => Some(vehicle),
            _ => None,
        }
    }

    /// Active vehicles in id order.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Active(vehicle) => Some(vehicle),
            Slot::Pending => None,
        })
    }

    /// Number of active vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.slots.values().filter(|slot| matches!(slot, Slot::Pending)).count()
    }

    /// Samples every active vehicle at `now_ms`. Vehicles without a sample
    /// are left out.
    #[must_use]
    pub fn snapshot(&self, now_ms: i64) -> Snapshot {
        self.vehicles()
            .filter_map(|vehicle| {
                sampler::sample(vehicle, now_ms).map(|sample| (vehicle.id().clone(), sample))
            })
            .collect()
    }

    /// Fetches routes for all missions concurrently and assigns each vehicle
    /// as soon as its route arrives.
    pub async fn dispatch<P>(&mut self, provider: &P, missions: Vec<Mission>) -> DispatchReport
    where
        P: RouteProvider + ?Sized,
    {
        let mut report = DispatchReport::default();
        let mut fetches = FuturesUnordered::new();

        for mission in missions {
            if let Err(err) = self.mark_pending(mission.vehicle_id.clone()) {
                warn!(vehicle = %mission.vehicle_id, error = %err, "mission skipped");
                report.failed.push((mission.vehicle_id, err));
                continue;
            }
            fetches.push(async move {
                let route = provider.route(mission.from, mission.to).await.map(Path::new);
                (mission.vehicle_id, mission.timing, route)
            });
        }

        while let Some((id, timing, route)) = fetches.next().await {
            match self.resolve(id.clone(), route, timing) {
                Ok(()) => report.assigned.push(id),
                Err(err) => report.failed.push((id, err)),
            }
        }

        report
    }

    fn activate(&mut self, id: VehicleId, path: Arc<Path>, timing: Timing) -> Result<()> {
        if !path.is_valid() {
            return Err(invalid_path!(
                "vehicle {} has {} point(s), need at least 2",
                id,
                path.point_count()
            ));
        }
        let vehicle = Vehicle::new(id.clone(), path, timing)?;

        info!(
            monotonic_counter.vehicles_assigned = 1,
            vehicle = %id,
            cycle_ms = timing.cycle_duration_ms,
            "vehicle assigned"
        );
        self.slots.insert(id, Slot::Active(vehicle));
        Ok(())
    }
}
