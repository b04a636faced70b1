//! Simulation engine errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = anyhow::Result<T, Error>;

/// Domain level error type returned by the simulation engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// A path with fewer than two points was supplied.
    #[error("code: invalid_path, description: {0}")]
    InvalidPath(String),

    /// A vehicle id is already assigned (or awaiting its route).
    #[error("code: duplicate_vehicle, description: {0}")]
    DuplicateVehicle(String),

    /// A cycle duration was zero or negative.
    #[error("code: invalid_duration, description: cycle duration must be positive, got {0}ms")]
    InvalidDuration(i64),

    /// The route provider failed to produce geometry.
    #[error("code: route_fetch, description: {0}")]
    RouteFetch(String),

    /// The referenced vehicle is not known to the fleet.
    #[error("code: not_found, description: {0}")]
    NotFound(String),

    /// A payload could not be serialized or deserialized.
    #[error("code: invalid_format, description: {0}")]
    InvalidFormat(String),

    /// A non recoverable internal error occurred.
    #[error("code: internal, description: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the stable error code associated with the variant.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::InvalidPath(_) => "invalid_path",
            Self::DuplicateVehicle(_) => "duplicate_vehicle",
            Self::InvalidDuration(_) => "invalid_duration",
            Self::RouteFetch(_) => "route_fetch",
            Self::NotFound(_) => "not_found",
            Self::InvalidFormat(_) => "invalid_format",
            Self::Internal(_) => "internal",
        }
    }

    /// Returns the error description.
    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");

        // if type is Error, return it with the newly added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("Error: {err}, caused by: {inner}");

            return match inner {
                Self::InvalidPath(_) => Self::InvalidPath(chain),
                Self::DuplicateVehicle(_) => Self::DuplicateVehicle(chain),
                Self::RouteFetch(_) => Self::RouteFetch(chain),
                Self::NotFound(_) => Self::NotFound(chain),
                Self::InvalidFormat(_) => Self::InvalidFormat(chain),
                Self::Internal(_) => Self::Internal(chain),
                Self::InvalidDuration(ms) => Self::InvalidDuration(*ms),
            };
        }

        // otherwise, return an Internal error
        Self::Internal(chain)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

#[macro_export]
macro_rules! invalid_path {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidPath(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidPath(format!($err))
    };
}

#[macro_export]
macro_rules! duplicate_vehicle {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::DuplicateVehicle(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::DuplicateVehicle(format!($err))
    };
}

#[macro_export]
macro_rules! not_found {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::NotFound(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::NotFound(format!($err))
    };
}
