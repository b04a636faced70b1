//! # Telemetry
//!
//! Simulated dashboard KPIs and the rolling activity feed. Each simulator
//! owns its state and random source and is advanced one tick at a time by
//! the host scheduler.

pub mod catalog;
pub mod feed;
pub mod format;
pub mod kpi;

pub use self::catalog::{ActivityGenerator, ActivitySimulator, MESSAGES};
pub use self::feed::{ActivityEvent, ActivityFeed, FEED_CAPACITY, record};
pub use self::format::format_compact;
pub use self::kpi::{Counter, Metric, TelemetrySimulator, TelemetryState, step};
