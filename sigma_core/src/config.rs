// sigma_core/src/config.rs

//! Filter configuration. Set once when the filter is built and never
//! changed afterwards.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::N_X;

/// Below this absolute yaw rate the CTRV model switches to straight-line motion.
pub const DEFAULT_YAW_RATE_EPSILON: f64 = 1e-3;
/// Smallest range used as the denominator of the radar range-rate.
pub const DEFAULT_MIN_RANGE: f64 = 1e-3;
/// Smallest acceptable squared Cholesky pivot of an innovation covariance.
pub const DEFAULT_MIN_INNOVATION_PIVOT: f64 = 1e-12;

/// Standard deviations of the two noise terms carried in the augmented state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessNoise {
    /// Longitudinal acceleration noise, m/s².
    pub std_a: f64,
    /// Yaw acceleration noise, rad/s².
    pub std_yawdd: f64,
}

impl Default for ProcessNoise {
    fn default() -> Self {
        Self {
            std_a: 0.5,
            std_yawdd: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    /// When false, laser records still initialize the filter but never update it.
    pub enabled: bool,
    pub std_px: f64,
    pub std_py: f64,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            std_px: 0.15,
            std_py: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    /// When false, radar records still initialize the filter but never update it.
    pub enabled: bool,
    /// Range noise, m.
    pub std_r: f64,
    /// Bearing noise, rad.
    pub std_phi: f64,
    /// Range-rate noise, m/s.
    pub std_rd: f64,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            std_r: 0.3,
            std_phi: 0.03,
            std_rd: 0.3,
        }
    }
}

/// Guards against division by (near) zero and near-singular matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericThresholds {
    pub yaw_rate_epsilon: f64,
    pub min_range: f64,
    pub min_innovation_pivot: f64,
}

impl Default for NumericThresholds {
    fn default() -> Self {
        Self {
            yaw_rate_epsilon: DEFAULT_YAW_RATE_EPSILON,
            min_range: DEFAULT_MIN_RANGE,
            min_innovation_pivot: DEFAULT_MIN_INNOVATION_PIVOT,
        }
    }
}

/// How speed and heading are seeded when the first record is a radar return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadarInitPolicy {
    /// Assume purely radial motion: speed `|ρ̇|`, heading along the bearing
    /// (or opposite to it when the target is closing).
    #[default]
    RadialVelocity,
    /// Ignore the range-rate and start from rest, as a laser record does.
    Stationary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UkfConfig {
    pub process_noise: ProcessNoise,
    pub laser: LaserConfig,
    pub radar: RadarConfig,
    pub thresholds: NumericThresholds,
    /// Diagonal of the covariance assigned on the bootstrap cycle.
    pub initial_variance: [f64; N_X],
    pub radar_init: RadarInitPolicy,
}

impl Default for UkfConfig {
    fn default() -> Self {
        Self {
            process_noise: ProcessNoise::default(),
            laser: LaserConfig::default(),
            radar: RadarConfig::default(),
            thresholds: NumericThresholds::default(),
            initial_variance: [1.0; N_X],
            radar_init: RadarInitPolicy::default(),
        }
    }
}

impl UkfConfig {
    /// Checks that every noise term and threshold is finite and positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = [
            ("process_noise.std_a", self.process_noise.std_a),
            ("process_noise.std_yawdd", self.process_noise.std_yawdd),
            ("laser.std_px", self.laser.std_px),
            ("laser.std_py", self.laser.std_py),
            ("radar.std_r", self.radar.std_r),
            ("radar.std_phi", self.radar.std_phi),
            ("radar.std_rd", self.radar.std_rd),
            ("thresholds.yaw_rate_epsilon", self.thresholds.yaw_rate_epsilon),
            ("thresholds.min_range", self.thresholds.min_range),
            (
                "thresholds.min_innovation_pivot",
                self.thresholds.min_innovation_pivot,
            ),
        ];
        for (name, value) in params {
            check_positive(name, value)?;
        }
        for value in self.initial_variance {
            check_positive("initial_variance", value)?;
        }
        Ok(())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(UkfConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_noise_is_rejected() {
        let mut config = UkfConfig::default();
        config.radar.std_phi = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "radar.std_phi",
                value: 0.0
            })
        );
    }

    #[test]
    fn nan_threshold_is_rejected() {
        let mut config = UkfConfig::default();
        config.thresholds.min_range = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_positive_initial_variance_is_rejected() {
        let mut config = UkfConfig::default();
        config.initial_variance[3] = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "initial_variance",
                ..
            })
        ));
    }
}
