use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use motion::Point;
use realtime::{RandomSource, SeededRandom, ThreadRandom};
use tracing::warn;

const ATLANTA: Point = Point::new(-84.3880, 33.7490);

#[derive(Debug, Clone)]
pub struct Config {
    pub timezone: Tz,
    pub frame_interval: Duration,
    pub telemetry_interval: Duration,
    pub activity_interval: Duration,
    pub vehicle_cycle_ms: i64,
    pub fleet_size: usize,
    pub center: Point,
    /// Width, in degrees, of the square that synthetic routes are drawn in.
    pub route_spread: f64,
    pub seed: Option<u64>,
    pub route_fetch_timeout: Option<Duration>,
    pub run_for: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Missing or
    /// unparsable values fall back to their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let timezone = var("TIMEZONE")
            .and_then(|value| value.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::America::New_York);
        let frame_interval = Duration::from_millis(env_ms(&var, "FRAME_INTERVAL_MS", 16));
        let telemetry_interval =
            Duration::from_millis(env_ms(&var, "TELEMETRY_INTERVAL_MS", 3_000));
        let activity_interval = Duration::from_millis(env_ms(&var, "ACTIVITY_INTERVAL_MS", 4_500));
        let vehicle_cycle_ms = env_i64(&var, "VEHICLE_CYCLE_MS", 30_000);
        let fleet_size = env_parse(&var, "FLEET_SIZE").unwrap_or(20);
        let center = Point::new(
            env_f64(&var, "CENTER_LNG", ATLANTA.lng()),
            env_f64(&var, "CENTER_LAT", ATLANTA.lat()),
        );
        let route_spread = env_f64(&var, "ROUTE_SPREAD", 0.1);
        let seed = env_parse(&var, "SIMULATION_SEED");
        let route_fetch_timeout = env_parse(&var, "ROUTE_FETCH_TIMEOUT_MS")
            .filter(|ms: &u64| *ms > 0)
            .map(Duration::from_millis);
        let run_for = env_parse(&var, "RUN_SECS").map(Duration::from_secs);

        Self {
            timezone,
            frame_interval,
            telemetry_interval,
            activity_interval,
            vehicle_cycle_ms,
            fleet_size,
            center,
            route_spread,
            seed,
            route_fetch_timeout,
            run_for,
        }
    }

    /// Random source for one independent stream of the simulation.
    ///
    /// With a seed configured, each stream is seeded from `seed + stream` so
    /// the timers never share a generator.
    pub fn random(&self, stream: u64) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed.wrapping_add(stream))),
            None => Box::new(ThreadRandom),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let value = var(key)?;
    let parsed = value.trim().parse::<T>().ok();
    if parsed.is_none() {
        warn!("{key} has invalid value {value:?}, using default");
    }
    parsed
}

fn env_f64(var: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    env_parse(var, key).filter(|value: &f64| value.is_finite()).unwrap_or(default)
}

fn env_i64(var: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> i64 {
    env_parse(var, key).unwrap_or(default)
}

/// Intervals must be positive.
fn env_ms(var: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    env_parse(var, key).filter(|ms: &u64| *ms > 0).unwrap_or(default)
}
