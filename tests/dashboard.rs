#![allow(missing_docs)]


use std::sync::Arc;
use std::time::Duration;

use delivery_network::provider::SyntheticRoutes;
use delivery_network::{Config, Dashboard};
use motion::VehicleId;
use pretty_assertions::assert_eq;
use realtime::{ManualClock, Scheduler};
use tokio::time;

use crate::provider::{MockPresenter, MockProvider};

// 2024-07-04T16:00:00Z
const NOW_MS: i64 = 1_720_108_800_000;

fn config(fleet_size: usize) -> Config {
    let mut config = Config::from_vars(|_| None);
    config.fleet_size = fleet_size;
    config.seed = Some(42);
    config
}

fn start(config: &Config, routes: MockProvider) -> (Dashboard, Arc<MockPresenter>, ManualClock) {
    let clock = ManualClock::new(NOW_MS);
    let scheduler = Scheduler::new(clock.clone());
    let presenter = Arc::new(MockPresenter::default());
    let dashboard = Dashboard::start(config, &scheduler, Arc::new(routes), Arc::clone(&presenter));
    (dashboard, presenter, clock)
}

#[tokio::test(start_paused = true)]
async fn timers_feed_presenter_independently() {
    let (dashboard, presenter, _clock) = start(&config(4), MockProvider::new());

    // Should render the reference telemetry before the first tick.
    assert_eq!(presenter.telemetry_count(), 1);

    time::sleep(Duration::from_millis(10_010)).await;

    // Should tick telemetry every 3s and activity every 4.5s.
    assert_eq!(presenter.telemetry_count(), 4);
    assert_eq!(presenter.activity_count(), 2);
    assert_eq!(dashboard.ticks("telemetry"), Some(3));
    assert_eq!(dashboard.ticks("activity"), Some(2));

    // Should render one frame per animation tick.
    let frames = dashboard.ticks("animation").expect("should have animation task");
    assert!(frames > 100);
    assert_eq!(presenter.frame_count(), usize::try_from(frames).expect("should fit"));

    let (now, snapshot) = presenter.last_frame().expect("should have a frame");
    assert_eq!(now, NOW_MS);
    let ids: Vec<_> = snapshot.keys().cloned().collect();
    assert_eq!(
        ids,
        vec![
            VehicleId::from("courier-01"),
            VehicleId::from("courier-02"),
            VehicleId::from("courier-03"),
            VehicleId::from("courier-04"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn failed_routes_only_drop_their_vehicle() {
    let (dashboard, presenter, _clock) =
        start(&config(4), MockProvider::new().failing_every(2));

    time::sleep(Duration::from_millis(3_500)).await;

    // Should show the vehicles whose routes resolved and keep running.
    let (_, snapshot) = presenter.last_frame().expect("should have a frame");
    assert_eq!(snapshot.len(), 2);
    assert_eq!(dashboard.deliveries().len(), 4);
    assert_eq!(presenter.telemetry_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn slow_routes_do_not_stall_timers() {
    let (_dashboard, presenter, _clock) =
        start(&config(3), MockProvider::new().with_latency(Duration::from_secs(4)));

    time::sleep(Duration::from_millis(3_500)).await;

    // Should keep animating and ticking telemetry while routes are pending.
    let (_, snapshot) = presenter.last_frame().expect("should have a frame");
    assert!(snapshot.is_empty());
    assert_eq!(presenter.telemetry_count(), 2);

    time::sleep(Duration::from_millis(1_000)).await;

    // Should show every vehicle once its route arrives.
    let (_, snapshot) = presenter.last_frame().expect("should have a frame");
    assert_eq!(snapshot.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn route_timeout_drops_vehicle() {
    let mut config = config(2);
    config.route_fetch_timeout = Some(Duration::from_millis(200));
    let (_dashboard, presenter, _clock) =
        start(&config, MockProvider::new().with_latency(Duration::from_secs(5)));

    time::sleep(Duration::from_millis(5_500)).await;

    // Should give up on both routes without affecting the timers.
    let (_, snapshot) = presenter.last_frame().expect("should have a frame");
    assert!(snapshot.is_empty());
    assert_eq!(presenter.telemetry_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn vehicles_follow_the_clock() {
    let (_dashboard, presenter, clock) = start(&config(2), MockProvider::new());

    time::sleep(Duration::from_millis(100)).await;
    let (_, before) = presenter.last_frame().expect("should have a frame");

    clock.advance(7_500);
    time::sleep(Duration::from_millis(100)).await;
    let (now, after) = presenter.last_frame().expect("should have a frame");

    // Should sample every vehicle at the clock's current time.
    assert_eq!(now, NOW_MS + 7_500);
    for (id, sample) in &after {
        assert_ne!(sample.position, before[id].position, "{id} did not move");
    }
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let (dashboard, presenter, _clock) = start(&config(2), MockProvider::new());

    time::sleep(Duration::from_secs(5)).await;
    dashboard.stop();
    dashboard.stop();
    assert!(dashboard.is_stopped());

    let frames = presenter.frame_count();
    let telemetry = presenter.telemetry_count();
    let activity = presenter.activity_count();

    time::sleep(Duration::from_secs(10)).await;

    // Should not render anything after stopping.
    assert_eq!(presenter.frame_count(), frames);
    assert_eq!(presenter.telemetry_count(), telemetry);
    assert_eq!(presenter.activity_count(), activity);
}

#[tokio::test(start_paused = true)]
async fn same_seed_same_simulation() {
    let config = config(5);
    let (a, first, _) = start(&config, MockProvider::new());
    let (b, second, _) = start(&config, MockProvider::new());

    time::sleep(Duration::from_millis(9_100)).await;

    // Should plan and simulate identically from the same seed.
    assert_eq!(a.deliveries(), b.deliveries());
    assert_eq!(
        *first.telemetry.lock().expect("should lock"),
        *second.telemetry.lock().expect("should lock")
    );

    let messages = |presenter: &MockPresenter| -> Vec<String> {
        let activity = presenter.activity.lock().expect("should lock");
        activity
            .last()
            .map(|feed| feed.iter().map(|e| e.message.clone()).collect())
            .unwrap_or_default()
    };
    assert_eq!(messages(&first), messages(&second));
}

#[tokio::test(start_paused = true)]
async fn synthetic_routes_drive_the_fleet() {
    let clock = ManualClock::new(NOW_MS);
    let scheduler = Scheduler::new(clock);
    let presenter = Arc::new(MockPresenter::default());
    let routes = Arc::new(SyntheticRoutes::with_latency(Duration::from_millis(250)));

    let dashboard = Dashboard::start(&config(20), &scheduler, routes, Arc::clone(&presenter));
    time::sleep(Duration::from_millis(500)).await;

    // Should place the whole default fleet on the map.
    let (_, snapshot) = presenter.last_frame().expect("should have a frame");
    assert_eq!(snapshot.len(), 20);
    assert!(snapshot.values().all(|s| (0.0..360.0).contains(&s.heading_degrees)));
    dashboard.stop();
}
