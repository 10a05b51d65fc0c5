// sigma_core/src/error.rs

use thiserror::Error;

use crate::messages::SensorKind;

/// Numerical and sequencing faults raised while processing a measurement.
///
/// None of these leave the filter half-updated: the cycle that raised the
/// error is abandoned and the last committed state stays in place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("augmented covariance is not positive definite; the filter has diverged")]
    NotPositiveDefinite,

    #[error("innovation covariance for {sensor} is singular or nearly singular")]
    SingularInnovation { sensor: SensorKind },

    #[error("cannot wrap non-finite angle {0}")]
    NonFiniteAngle(f64),

    #[error("{stage} produced a non-finite state")]
    NonFiniteState { stage: &'static str },

    #[error("measurement at {current_us}us arrived after {previous_us}us")]
    OutOfOrder { previous_us: u64, current_us: u64 },

    #[error("{sensor} measurement contains a non-finite value")]
    NonFiniteMeasurement { sensor: SensorKind },

    #[error("filter has not been initialized with a first measurement")]
    NotInitialized,

    #[error("measurement update requested before any prediction")]
    NoPrediction,
}

/// Rejected filter configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid parameter `{name}`: {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },
}
