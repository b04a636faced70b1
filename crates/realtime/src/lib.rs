//! # Realtime Core
//!
//! Core modules shared by the simulation engine: errors, clock and
//! randomness providers, and the repeating-task scheduler.

mod error;
mod provider;
pub mod schedule;

pub use crate::error::*;
pub use crate::provider::*;
pub use crate::schedule::{Scheduler, TaskHandle};
