// sigma_sim/src/simulation/config/structs.rs

use serde::{Deserialize, Serialize};
use sigma_core::config::UkfConfig;

use crate::simulation::core::error::SimError;

// =========================================================================
// == Top-Level Scenario Configuration ==
// =========================================================================

/// Everything a run needs: the filter's tuning and the synthetic scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub filter: UkfConfig,
    pub simulation: SimulationConfig,
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.filter.validate()?;
        self.simulation.validate()
    }
}

// =========================================================================
// == Synthetic Scenario ==
// =========================================================================

/// Timing and randomness for the synthetic scenario. Sensor noise comes from
/// the `[filter]` table so the filter is tuned to the data it sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub duration_s: f64,
    /// Ground-truth integration step. Sensors sample on these ticks.
    pub step_us: u64,
    pub laser_period_us: u64,
    pub radar_period_us: u64,
    /// Delay of the first radar sample, so the two sensors interleave.
    pub radar_offset_us: u64,
    pub target: TargetConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            duration_s: 25.0,
            step_us: 10_000,
            laser_period_us: 100_000,
            radar_period_us: 100_000,
            radar_offset_us: 50_000,
            target: TargetConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn duration_us(&self) -> u64 {
        (self.duration_s * 1.0e6).round() as u64
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.duration_s.is_finite() && self.duration_s > 0.0) {
            return Err(SimError::InvalidSimulation {
                name: "simulation.duration_s",
                value: self.duration_s,
            });
        }
        let periods = [
            ("simulation.step_us", self.step_us),
            ("simulation.laser_period_us", self.laser_period_us),
            ("simulation.radar_period_us", self.radar_period_us),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(SimError::InvalidSimulation { name, value: 0.0 });
            }
        }
        self.target.validate()
    }
}

/// Initial CTRV state of the simulated target and the random accelerations
/// that perturb it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub px: f64,
    pub py: f64,
    pub speed: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    /// Std-dev of the longitudinal acceleration (m/s²). Zero for a pure CTRV target.
    pub std_a: f64,
    /// Std-dev of the yaw acceleration (rad/s²).
    pub std_yawdd: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            px: 0.6,
            py: 0.6,
            speed: 5.0,
            yaw: 0.0,
            yaw_rate: 0.3,
            std_a: 0.2,
            std_yawdd: 0.2,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let finite = [
            ("simulation.target.px", self.px),
            ("simulation.target.py", self.py),
            ("simulation.target.speed", self.speed),
            ("simulation.target.yaw", self.yaw),
            ("simulation.target.yaw_rate", self.yaw_rate),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::InvalidSimulation { name, value });
            }
        }
        for (name, value) in [
            ("simulation.target.std_a", self.std_a),
            ("simulation.target.std_yawdd", self.std_yawdd),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidSimulation { name, value });
            }
        }
        Ok(())
    }
}
