// sigma_sim/src/simulation/scenario.rs

//! Synthetic scenario: a single CTRV target observed by a laser and a radar
//! sampling at independent periods.

use rand_distr::{Distribution, Normal};
use sigma_core::config::{LaserConfig, RadarConfig};
use sigma_core::messages::MeasurementRecord;
use sigma_core::models::estimation::dynamics::{ctrv::CtrvModel, ProcessModel};
use sigma_core::types::{AugmentedVector, StateVector};
use sigma_core::utils::angles::wrap_angle;
use tracing::debug;

use crate::simulation::config::{ScenarioConfig, SimulationConfig};
use crate::simulation::core::error::SimError;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::topics::{GroundTruth, LoggedMeasurement};

/// Generates the whole measurement log for `config`. The same configuration
/// (seed included) always produces the same log.
pub fn generate(config: &ScenarioConfig) -> Result<Vec<LoggedMeasurement>, SimError> {
    config.validate()?;
    let mut generator = ScenarioGenerator::new(config)?;
    generator.run()
}

struct SensorNoise {
    laser_px: Normal<f64>,
    laser_py: Normal<f64>,
    radar_r: Normal<f64>,
    radar_phi: Normal<f64>,
    radar_rd: Normal<f64>,
    accel: Normal<f64>,
    yaw_accel: Normal<f64>,
}

impl SensorNoise {
    fn new(
        sim: &SimulationConfig,
        laser: &LaserConfig,
        radar: &RadarConfig,
    ) -> Result<Self, SimError> {
        Ok(Self {
            laser_px: normal("filter.laser.std_px", laser.std_px)?,
            laser_py: normal("filter.laser.std_py", laser.std_py)?,
            radar_r: normal("filter.radar.std_r", radar.std_r)?,
            radar_phi: normal("filter.radar.std_phi", radar.std_phi)?,
            radar_rd: normal("filter.radar.std_rd", radar.std_rd)?,
            accel: normal("simulation.target.std_a", sim.target.std_a)?,
            yaw_accel: normal("simulation.target.std_yawdd", sim.target.std_yawdd)?,
        })
    }
}

fn normal(name: &'static str, std_dev: f64) -> Result<Normal<f64>, SimError> {
    Normal::new(0.0, std_dev).map_err(|_| SimError::InvalidSimulation {
        name,
        value: std_dev,
    })
}

struct ScenarioGenerator {
    sim: SimulationConfig,
    min_range: f64,
    model: CtrvModel,
    noise: SensorNoise,
    rng: SimulationRng,
    /// Ground-truth CTRV state `[px, py, v, yaw, yaw_rate]`.
    truth: StateVector,
}

impl ScenarioGenerator {
    fn new(config: &ScenarioConfig) -> Result<Self, SimError> {
        let sim = config.simulation.clone();
        let target = sim.target;
        Ok(Self {
            noise: SensorNoise::new(&sim, &config.filter.laser, &config.filter.radar)?,
            rng: SimulationRng::seeded(sim.seed),
            min_range: config.filter.thresholds.min_range,
            model: CtrvModel::new(config.filter.thresholds.yaw_rate_epsilon),
            truth: StateVector::new(
                target.px,
                target.py,
                target.speed,
                target.yaw,
                target.yaw_rate,
            ),
            sim,
        })
    }

    fn run(&mut self) -> Result<Vec<LoggedMeasurement>, SimError> {
        let duration_us = self.sim.duration_us();
        let step_us = self.sim.step_us;
        let dt = step_us as f64 / 1.0e6;

        let mut log = Vec::new();
        let mut next_laser_us = 0;
        let mut next_radar_us = self.sim.radar_offset_us;
        let mut t_us = 0;

        while t_us <= duration_us {
            // Sensors sample on truth ticks; a period that is not a multiple
            // of the step lands on the next tick.
            if t_us >= next_laser_us {
                log.push(self.sample_laser(t_us));
                next_laser_us += self.sim.laser_period_us;
            }
            if t_us >= next_radar_us {
                log.push(self.sample_radar(t_us)?);
                next_radar_us += self.sim.radar_period_us;
            }
            self.step(dt);
            t_us += step_us;
        }

        debug!(
            records = log.len(),
            seed = self.sim.seed,
            "synthetic scenario generated"
        );
        Ok(log)
    }

    /// Advances the truth by `dt` under a freshly drawn pair of accelerations.
    fn step(&mut self, dt: f64) {
        let nu_a = self.noise.accel.sample(&mut self.rng.0);
        let nu_yawdd = self.noise.yaw_accel.sample(&mut self.rng.0);
        let t = &self.truth;
        let augmented =
            AugmentedVector::from_column_slice(&[t[0], t[1], t[2], t[3], t[4], nu_a, nu_yawdd]);
        self.truth = self.model.propagate(&augmented, dt);
    }

    fn ground_truth(&self) -> GroundTruth {
        let (px, py, v, yaw) = (self.truth[0], self.truth[1], self.truth[2], self.truth[3]);
        GroundTruth {
            px,
            py,
            vx: v * yaw.cos(),
            vy: v * yaw.sin(),
        }
    }

    fn sample_laser(&mut self, timestamp_us: u64) -> LoggedMeasurement {
        let truth = self.ground_truth();
        let rng = &mut self.rng.0;
        let record = MeasurementRecord::laser(
            truth.px + self.noise.laser_px.sample(rng),
            truth.py + self.noise.laser_py.sample(rng),
            timestamp_us,
        );
        LoggedMeasurement::new(record, Some(truth))
    }

    fn sample_radar(&mut self, timestamp_us: u64) -> Result<LoggedMeasurement, SimError> {
        let truth = self.ground_truth();
        let range = truth.px.hypot(truth.py);
        let bearing = truth.py.atan2(truth.px);
        let range_rate = (truth.px * truth.vx + truth.py * truth.vy) / range.max(self.min_range);

        let rng = &mut self.rng.0;
        let record = MeasurementRecord::radar(
            range + self.noise.radar_r.sample(rng),
            wrap_angle(bearing + self.noise.radar_phi.sample(rng))?,
            range_rate + self.noise.radar_rd.sample(rng),
            timestamp_us,
        );
        Ok(LoggedMeasurement::new(record, Some(truth)))
    }
}
