//! # Schedule
//!
//! Repeating tasks driven by a shared [`Clock`]. Every task owns its state
//! exclusively and receives the clock's current time on each tick; the
//! returned [`TaskHandle`] cancels it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::provider::Clock;

/// Spawns repeating tasks bound to a single clock.
#[derive(Debug)]
pub struct Scheduler<C> {
    clock: Arc<C>,
}

impl<C> Clone for Scheduler<C> {
    fn clone(&self) -> Self {
        Self { clock: Arc::clone(&self.clock) }
    }
}

impl<C: Clock + 'static> Scheduler<C> {
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self { clock: Arc::new(clock) }
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time of the scheduler's clock.
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Runs `tick` every `period`, first firing one period from now.
    ///
    /// Must be called from within a tokio runtime. A zero period is raised to
    /// one millisecond.
    pub fn every<F>(&self, name: &'static str, period: Duration, mut tick: F) -> TaskHandle
    where
        F: FnMut(i64) + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));

        let clock = Arc::clone(&self.clock);
        let flag = Arc::clone(&stopped);
        let counter = Arc::clone(&ticks);

        let join = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                // a tick that was already due when the task was stopped
                if flag.load(Ordering::Acquire) {
                    break;
                }
                tick(clock.now_ms());
                counter.fetch_add(1, Ordering::Relaxed);
            }
            debug!(task = name, "repeating task exited");
        });

        debug!(task = name, period = ?period, "repeating task started");
        TaskHandle { name, stopped, ticks, join }
    }
}

/// Handle to a repeating task. Dropping the handle stops the task.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    stopped: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Stops the task. Safe to call any number of times.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.join.abort();
        debug!(task = self.name, ticks = self.ticks(), "repeating task stopped");
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Number of ticks the task has run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::provider::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn fires_on_period() {
        let scheduler = Scheduler::new(ManualClock::new(0));
        let handle = scheduler.every("telemetry", Duration::from_millis(3_000), |_| {});

        time::sleep(Duration::from_millis(2_900)).await;
        assert_eq!(handle.ticks(), 0);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(handle.ticks(), 1);

        time::sleep(Duration::from_millis(6_000)).await;
        assert_eq!(handle.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_clock_time() {
        let clock = ManualClock::new(0);
        let scheduler = Scheduler::new(clock.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _handle = scheduler.every("frames", Duration::from_millis(10), move |now| {
            sink.lock().expect("lock").push(now);
        });

        clock.set(42);
        time::sleep(Duration::from_millis(15)).await;
        clock.set(84);
        time::sleep(Duration::from_millis(10)).await;

        assert_eq!(*seen.lock().expect("lock"), vec![42, 84]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let scheduler = Scheduler::new(ManualClock::new(0));
        let handle = scheduler.every("activity", Duration::from_millis(4_500), |_| {});

        time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(handle.ticks(), 1);

        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());

        time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(handle.ticks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_are_independent() {
        let scheduler = Scheduler::new(ManualClock::new(0));
        let telemetry = scheduler.every("telemetry", Duration::from_millis(3_000), |_| {});
        let activity = scheduler.every("activity", Duration::from_millis(4_500), |_| {});

        time::sleep(Duration::from_millis(9_100)).await;
        assert_eq!(telemetry.ticks(), 3);
        assert_eq!(activity.ticks(), 2);

        telemetry.stop();
        time::sleep(Duration::from_millis(4_500)).await;
        assert_eq!(telemetry.ticks(), 3);
        assert_eq!(activity.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_task() {
        let scheduler = Scheduler::new(ManualClock::new(0));
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let handle = scheduler.every("frames", Duration::from_millis(16), move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        time::sleep(Duration::from_millis(40)).await;
        drop(handle);

        let before = count.load(Ordering::Relaxed);
        time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::Relaxed), before);
    }
}
