//! # Delivery Network
//!
//! Host runtime for the delivery dashboard simulation. [`Dashboard::start`]
//! plans a fleet of deliveries, requests their routes, and starts the three
//! repeating tasks that feed a [`Presenter`]: vehicle animation, KPI
//! telemetry, and the activity feed.

mod config;
pub mod provider;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use motion::{FleetController, Path, Point, RouteProvider, Snapshot, Timing, VehicleId};
use realtime::{Clock, Scheduler, TaskHandle};
use serde::Serialize;
use telemetry::{
    ActivityEvent, ActivityGenerator, ActivitySimulator, TelemetrySimulator, TelemetryState,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

pub use crate::config::Config;
use crate::provider::{Delivery, Plan, plan_deliveries};

const PLANNING_STREAM: u64 = 0;
const TELEMETRY_STREAM: u64 = 1;
const ACTIVITY_STREAM: u64 = 2;

/// Receives everything the dashboard renders.
///
/// Each method is called from a single repeating task; implementations must
/// return promptly.
pub trait Presenter: Send + Sync + 'static {
    /// Vehicle positions for the frame at `now_ms`.
    fn vehicles(&self, now_ms: i64, snapshot: &Snapshot);

    fn telemetry(&self, state: &TelemetryState);

    /// Feed contents, newest first.
    fn activity(&self, events: &[ActivityEvent]);
}

/// Writes every update to the log as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn vehicles(&self, now_ms: i64, snapshot: &Snapshot) {
        trace!(gauge.vehicles_on_map = snapshot.len(), now_ms, vehicles = %json(snapshot));
    }

    fn telemetry(&self, state: &TelemetryState) {
        info!(telemetry = %json(state), "telemetry updated");
    }

    fn activity(&self, events: &[ActivityEvent]) {
        if let Some(latest) = events.first() {
            info!(id = latest.id, timestamp = %latest.timestamp, "{}", latest.message);
        }
        debug!(feed = %json(events), "activity feed updated");
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        let err = realtime::Error::from(err);
        warn!(code = err.code(), error = %err, "failed to serialize update");
        String::new()
    })
}

/// A route fetch outcome on its way back to the animation task.
struct Resolved {
    vehicle_id: VehicleId,
    timing: Timing,
    route: anyhow::Result<Path>,
}

/// A running dashboard simulation. Dropping it stops every task.
#[derive(Debug)]
pub struct Dashboard {
    deliveries: Vec<Delivery>,
    tasks: Vec<TaskHandle>,
    fetches: Vec<JoinHandle<()>>,
}

impl Dashboard {
    /// Plans the fleet and starts the animation, telemetry, and activity
    /// tasks. Routes are fetched in the background; each vehicle appears on
    /// the first frame after its own route resolves.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<C, P, V>(
        config: &Config, scheduler: &Scheduler<C>, routes: Arc<P>, presenter: Arc<V>,
    ) -> Self
    where
        C: Clock + 'static,
        P: RouteProvider + 'static,
        V: Presenter,
    {
        let plan = Plan {
            count: config.fleet_size,
            center: config.center,
            spread: config.route_spread,
            cycle_duration_ms: config.vehicle_cycle_ms,
            now_ms: scheduler.now_ms(),
        };
        let deliveries = plan_deliveries(&plan, &mut config.random(PLANNING_STREAM));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut fleet = FleetController::new();
        let mut fetches = Vec::with_capacity(deliveries.len());

        for delivery in &deliveries {
            let mission = delivery.mission.clone();
            if let Err(err) = fleet.mark_pending(mission.vehicle_id.clone()) {
                warn!(vehicle = %mission.vehicle_id, error = %err, "delivery skipped");
                continue;
            }
            debug!(
                vehicle = %mission.vehicle_id,
                hub = delivery.hub,
                traffic = ?delivery.traffic,
                "requesting route"
            );

            let routes = Arc::clone(&routes);
            let tx = tx.clone();
            let timeout = config.route_fetch_timeout;
            fetches.push(tokio::spawn(async move {
                let route = fetch_route(routes.as_ref(), mission.from, mission.to, timeout).await;
                let resolved =
                    Resolved { vehicle_id: mission.vehicle_id, timing: mission.timing, route };
                if tx.send(resolved).is_err() {
                    debug!("dashboard stopped before route arrived");
                }
            }));
        }
        drop(tx);

        presenter.telemetry(&TelemetryState::initial());

        let animation = {
            let presenter = Arc::clone(&presenter);
            scheduler.every("animation", config.frame_interval, move |now_ms| {
                while let Ok(Resolved { vehicle_id, timing, route }) = rx.try_recv() {
                    if let Err(err) = fleet.resolve(vehicle_id.clone(), route, timing) {
                        warn!(
                            vehicle = %vehicle_id,
                            code = err.code(),
                            error = %err,
                            "vehicle not started"
                        );
                    }
                }
                presenter.vehicles(now_ms, &fleet.snapshot(now_ms));
            })
        };

        let telemetry = {
            let presenter = Arc::clone(&presenter);
            let mut simulator = TelemetrySimulator::new(config.random(TELEMETRY_STREAM));
            scheduler.every("telemetry", config.telemetry_interval, move |_| {
                presenter.telemetry(simulator.tick());
            })
        };

        let activity = {
            let generator = ActivityGenerator::new(config.timezone);
            let mut simulator = ActivitySimulator::new(generator, config.random(ACTIVITY_STREAM));
            scheduler.every("activity", config.activity_interval, move |now_ms| {
                presenter.activity(simulator.tick(now_ms).events());
            })
        };

        info!(vehicles = deliveries.len(), "dashboard started");
        Self { deliveries, tasks: vec![animation, telemetry, activity], fetches }
    }

    /// Deliveries planned at start, including any whose route failed.
    #[must_use]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Stops every task and abandons outstanding route fetches. Safe to call
    /// more than once.
    pub fn stop(&self) {
        if self.is_stopped() {
            return;
        }
        for task in &self.tasks {
            task.stop();
        }
        for fetch in &self.fetches {
            fetch.abort();
        }
        info!("dashboard stopped");
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.tasks.iter().all(TaskHandle::is_stopped)
    }

    /// Tick count of the named task (`animation`, `telemetry` or `activity`).
    #[must_use]
    pub fn ticks(&self, task: &str) -> Option<u64> {
        self.tasks.iter().find(|t| t.name() == task).map(TaskHandle::ticks)
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn fetch_route<P>(
    routes: &P, from: Point, to: Point, timeout: Option<Duration>,
) -> anyhow::Result<Path>
where
    P: RouteProvider + ?Sized,
{
    let request = routes.route(from, to);
    let points = match timeout {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .unwrap_or_else(|_| Err(anyhow!("no response after {}ms", limit.as_millis()))),
        None => request.await,
    };
    let points = points.with_context(|| format!("fetching route {from} -> {to}"))?;
    Ok(Path::new(points))
}
