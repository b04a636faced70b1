//! Bounded, most-recent-first log of dashboard activity.

use serde::{Deserialize, Serialize};

/// Maximum number of events the feed keeps.
pub const FEED_CAPACITY: usize = 5;

/// A single notification shown in the activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Monotonic per-session identifier.
    pub id: u64,
    pub message: String,
    /// Wall-clock time, formatted for display.
    pub timestamp: String,
}

/// The feed contents, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityFeed {
    events: Vec<ActivityEvent>,
}

impl ActivityFeed {
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    #[must_use]
    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ActivityEvent> {
        self.events.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Prepends `event`, evicting the oldest entries beyond [`FEED_CAPACITY`].
#[must_use]
pub fn record(event: ActivityEvent, feed: ActivityFeed) -> ActivityFeed {
    let mut events = feed.events;
    events.insert(0, event);
    events.truncate(FEED_CAPACITY);
    ActivityFeed { events }
}
