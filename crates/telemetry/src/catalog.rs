//! Synthesized activity notifications.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use realtime::RandomSource;
use tracing::{debug, warn};

use crate::feed::{self, ActivityEvent, ActivityFeed};

/// Messages the activity feed draws from.
pub const MESSAGES: [&str; 10] = [
    "New order received at Downtown Hub",
    "Courier picked up order from Midtown Eats",
    "Delivery completed in Old Fourth Ward",
    "Edgewood Kitchen is accepting orders again",
    "Courier rerouted around traffic near Westside Provisions",
    "Order delivered 4 minutes ahead of estimate",
    "Demand surge detected in Midtown",
    "New restaurant partner onboarded in Inman Park",
    "Courier shift started in Downtown",
    "Customer rated delivery 5 stars",
];

const TIME_FORMAT: &str = "%H:%M:%S";

/// Produces activity events: monotonic ids, a uniformly chosen catalog
/// message, and a local wall-clock timestamp.
#[derive(Debug, Clone)]
pub struct ActivityGenerator {
    next_id: u64,
    messages: Vec<String>,
    timezone: Tz,
}

impl ActivityGenerator {
    #[must_use]
    pub fn new(timezone: Tz) -> Self {
        Self { next_id: 1, messages: MESSAGES.iter().map(ToString::to_string).collect(), timezone }
    }

    /// Replaces the message catalog. An empty catalog is ignored.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        if messages.is_empty() {
            warn!("empty activity catalog ignored");
            return self;
        }
        self.messages = messages;
        self
    }

    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Creates the next event for the instant `now_ms`.
    pub fn next_event<R>(&mut self, now_ms: i64, rng: &mut R) -> ActivityEvent
    where
        R: RandomSource + ?Sized,
    {
        let message = self.messages[rng.next_index(self.messages.len())].clone();
        let id = self.next_id;
        self.next_id += 1;

        ActivityEvent { id, message, timestamp: self.timestamp(now_ms) }
    }

    fn timestamp(&self, now_ms: i64) -> String {
        let utc = DateTime::<Utc>::from_timestamp_millis(now_ms).unwrap_or_default();
        utc.with_timezone(&self.timezone).format(TIME_FORMAT).to_string()
    }
}

/// Owns the activity feed and its random source; the only writer of the feed.
#[derive(Debug, Clone)]
pub struct ActivitySimulator<R> {
    feed: ActivityFeed,
    generator: ActivityGenerator,
    rng: R,
}

impl<R: RandomSource> ActivitySimulator<R> {
    #[must_use]
    pub const fn new(generator: ActivityGenerator, rng: R) -> Self {
        Self { feed: ActivityFeed::new(), generator, rng }
    }

    #[must_use]
    pub const fn feed(&self) -> &ActivityFeed {
        &self.feed
    }

    /// Records one synthesized event and returns the updated feed.
    pub fn tick(&mut self, now_ms: i64) -> &ActivityFeed {
        let event = self.generator.next_event(now_ms, &mut self.rng);
        debug!(monotonic_counter.activity_events = 1, id = event.id, message = %event.message);

        let current = std::mem::take(&mut self.feed);
        self.feed = feed::record(event, current);
        &self.feed
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::America::New_York;
    use chrono_tz::UTC;
    use pretty_assertions::assert_eq;
    use realtime::SequenceRandom;

    use super::*;

    // 2024-03-01T17:04:05Z
    const NOW_MS: i64 = 1_709_312_645_000;

    #[test]
    fn picks_uniformly_from_catalog() {
        let mut generator = ActivityGenerator::new(UTC);
        let mut rng = SequenceRandom::new([0.0, 0.55, 0.999]);

        let messages: Vec<_> =
            (0..3).map(|_| generator.next_event(NOW_MS, &mut rng).message).collect();
        assert_eq!(messages, vec![MESSAGES[0], MESSAGES[5], MESSAGES[9]]);
    }

    #[test]
    fn ids_are_monotonic() {
        let mut generator = ActivityGenerator::new(UTC);
        let mut rng = SequenceRandom::new([0.3]);

        let ids: Vec<_> = (0..4).map(|_| generator.next_event(NOW_MS, &mut rng).id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn timestamp_in_timezone() {
        let mut rng = SequenceRandom::new([0.0]);

        let utc = ActivityGenerator::new(UTC).next_event(NOW_MS, &mut rng);
        assert_eq!(utc.timestamp, "17:04:05");

        let atlanta = ActivityGenerator::new(New_York).next_event(NOW_MS, &mut rng);
        assert_eq!(atlanta.timestamp, "12:04:05");
    }

    #[test]
    fn custom_catalog() {
        let mut generator =
            ActivityGenerator::new(UTC).with_messages(vec!["only message".to_string()]);
        let mut rng = SequenceRandom::new([0.9]);
        assert_eq!(generator.next_event(NOW_MS, &mut rng).message, "only message");

        let generator = ActivityGenerator::new(UTC).with_messages(vec![]);
        assert_eq!(generator.messages().len(), MESSAGES.len());
    }

    #[test]
    fn simulator_keeps_bounded_feed() {
        let mut simulator =
            ActivitySimulator::new(ActivityGenerator::new(UTC), SequenceRandom::new([0.1, 0.7]));
        for tick in 0..7 {
            simulator.tick(NOW_MS + tick * 4_500);
        }

        let ids: Vec<_> = simulator.feed().events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert_eq!(simulator.feed().events()[0].timestamp, "17:04:32");
    }
}
