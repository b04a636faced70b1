//! # Provider
//!
//! Provider defines the time and randomness sources the engine depends on.
//! Both are injected so simulations can run against a fixed clock and a
//! fixed random sequence under test.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The `Clock` trait supplies wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock whose time only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(start_ms)) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::Acquire)
    }
}

/// The `RandomSource` trait supplies uniform random values in `[0, 1)`.
pub trait RandomSource: Send {
    /// Next uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, len)`. Returns 0 when `len` is 0.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len - 1)
    }

    /// Uniform integer step in `[-max, +max]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn next_step(&mut self, max: u32) -> i64 {
        let width = 2 * max as usize + 1;
        self.next_index(width) as i64 - i64::from(max)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Randomness from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

/// Deterministic, seedable randomness.
#[derive(Debug, Clone)]
pub struct SeededRandom(ChaCha8Rng);

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// Replays a fixed sequence of values, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// Values outside `[0, 1)` are clamped into range.
    #[must_use]
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values.into().into_iter().map(|v| v.clamp(0.0, 1.0 - f64::EPSILON)).collect();
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_shared() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        other.advance(500);
        assert_eq!(clock.now_ms(), 1_500);

        clock.set(42);
        assert_eq!(other.now_ms(), 42);
    }

    #[test]
    fn sequence_wraps() {
        let mut rng = SequenceRandom::new([0.1, 0.9]);
        let got: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
        assert_eq!(got, vec![0.1, 0.9, 0.1, 0.9, 0.1]);
    }

    #[test]
    fn empty_sequence_yields_zero() {
        let mut rng = SequenceRandom::default();
        assert!(rng.next_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn index_stays_in_range() {
        let mut rng = SequenceRandom::new([0.0, 0.5, 0.999_999, 1.0]);
        assert_eq!(rng.next_index(4), 0);
        assert_eq!(rng.next_index(4), 2);
        assert_eq!(rng.next_index(4), 3);
        assert_eq!(rng.next_index(4), 3);
        assert_eq!(rng.next_index(0), 0);
    }

    #[test]
    fn step_covers_symmetric_range() {
        let mut rng = SequenceRandom::new([0.0, 0.5, 0.99]);
        assert_eq!(rng.next_step(1), -1);
        assert_eq!(rng.next_step(1), 0);
        assert_eq!(rng.next_step(1), 1);
        assert_eq!(rng.next_step(0), 0);
    }

    #[test]
    fn seeded_is_deterministic() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..100 {
            let value = a.next_f64();
            assert!((0.0..1.0).contains(&value));
            assert!((value - b.next_f64()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn boxed_source_delegates() {
        let mut rng: Box<dyn RandomSource> = Box::new(SequenceRandom::new([0.25]));
        assert_eq!(rng.next_index(8), 2);
    }
}
