#![allow(missing_docs)]

use chrono_tz::America::New_York;
use pretty_assertions::assert_eq;
use realtime::{SeededRandom, SequenceRandom};
use telemetry::{
    ActivityGenerator, ActivitySimulator, FEED_CAPACITY, Metric, TelemetrySimulator,
    TelemetryState,
};

// 2024-07-04T16:00:00Z
const NOW_MS: i64 = 1_720_108_800_000;

#[test]
fn kpis_stay_bounded_over_a_long_session() {
    let mut simulator = TelemetrySimulator::new(SeededRandom::new(42));

    // Should keep every counter within bounds for a day of 3s ticks.
    for _ in 0..28_800 {
        let state = simulator.tick();
        assert!(state.in_bounds(), "out of bounds: {state:?}");
    }
}

#[test]
fn same_seed_same_walk() {
    let mut a = TelemetrySimulator::new(SeededRandom::new(9));
    let mut b = TelemetrySimulator::new(SeededRandom::new(9));

    // Should produce identical states from identical seeds.
    for _ in 0..500 {
        assert_eq!(a.tick(), b.tick());
    }
}

#[test]
fn avg_delivery_time_cannot_exceed_ceiling() {
    let mut simulator = TelemetrySimulator::new(SequenceRandom::new([0.99]));
    for _ in 0..50 {
        simulator.tick();
    }

    let counter = simulator.state().counter(Metric::AvgDeliveryMinutes);
    assert_eq!(counter.value, 35);
    assert_eq!(Metric::AvgDeliveryMinutes.display(counter.value), "35m");
}

#[test]
fn telemetry_serializes_for_presenters() {
    let json = serde_json::to_value(TelemetryState::initial()).expect("should serialize");

    assert_eq!(json["activeUsers"]["value"], 12_500);
    assert_eq!(json["avgDeliveryMinutes"]["ceiling"], 35);
    assert!(json["activeRestaurants"]["ceiling"].is_null());
}

#[test]
fn feed_keeps_most_recent_events() {
    let generator = ActivityGenerator::new(New_York);
    let mut simulator = ActivitySimulator::new(generator, SeededRandom::new(1));

    for tick in 0..7 {
        simulator.tick(NOW_MS + tick * 4_500);
    }

    // Should hold the five newest events, newest first.
    let feed = simulator.feed();
    assert_eq!(feed.len(), FEED_CAPACITY);
    let ids: Vec<_> = feed.events().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);

    // Should stamp events with local time.
    assert_eq!(feed.events()[4].timestamp, "12:00:09");
    assert_eq!(feed.events()[0].timestamp, "12:00:27");
}

#[test]
fn feed_messages_come_from_catalog() {
    let generator = ActivityGenerator::new(New_York);
    let catalog = generator.messages().to_vec();
    let mut simulator = ActivitySimulator::new(generator, SeededRandom::new(77));

    for tick in 0..20 {
        simulator.tick(NOW_MS + tick * 4_500);
    }

    // Should only ever show catalog messages.
    assert!(simulator.feed().events().iter().all(|e| catalog.contains(&e.message)));
}
