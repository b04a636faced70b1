//! # Motion
//!
//! Turns waypoint sequences into a continuously queryable position and
//! heading, and manages the fleet of vehicles travelling them.

pub mod fleet;
pub mod geometry;
pub mod path;
pub mod provider;
pub mod sampler;
mod vehicle;

pub use self::fleet::{DispatchReport, FleetController, Snapshot, VehicleStatus};
pub use self::path::{Path, Point};
pub use self::provider::{Mission, RouteProvider};
pub use self::vehicle::{MotionSample, Timing, Vehicle, VehicleId};
