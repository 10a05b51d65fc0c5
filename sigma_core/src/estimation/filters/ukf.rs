// sigma_core/src/estimation/filters/ukf.rs

use nalgebra::{Vector2, Vector3};
use std::f64::consts::PI;
use tracing::{debug, trace};

// --- Core Library Imports ---
use crate::config::{RadarInitPolicy, UkfConfig};
use crate::error::{ConfigError, FilterError};
use crate::estimation::sigma_points::{generate_augmented_sigma_points, sigma_weights, LAMBDA};
use crate::estimation::unscented::{
    predict_mean_and_covariance, predict_measurement, propagate_sigma_points,
};
use crate::estimation::update::{kalman_update, Innovation, InnovationStats};
use crate::estimation::{ProcessOutcome, StateEstimator};
use crate::messages::{MeasurementData, MeasurementRecord};
use crate::models::estimation::dynamics::ctrv::CtrvModel;
use crate::models::estimation::dynamics::ProcessModel;
use crate::models::estimation::measurement::laser::LaserModel;
use crate::models::estimation::measurement::radar::RadarModel;
use crate::models::estimation::measurement::MeasurementModel;
use crate::state::{StateVariable, TrackState};
use crate::types::{Observation, PredictedSigmaPoints, SigmaWeights, StateCovariance, StateVector};
use crate::utils::angles::wrap_angle;

/// An Unscented Kalman Filter tracking one object with the CTRV model,
/// fed by radar and laser measurements.
#[derive(Debug, Clone)]
pub struct UnscentedKalmanFilter {
    config: UkfConfig,
    process_model: Box<dyn ProcessModel>,
    radar_model: RadarModel,
    laser_model: LaserModel,

    // --- UKF-specific internal state ---
    /// Weights for recombining the sigma points.
    weights: SigmaWeights,
    /// `None` until the first measurement arrives.
    state: Option<TrackState>,
    /// Sigma points of the latest prediction. The measurement update of the
    /// same cycle reuses them.
    xsig_pred: Option<PredictedSigmaPoints>,
}

impl UnscentedKalmanFilter {
    /// Creates an uninitialized filter. The first processed record seeds the state.
    pub fn new(config: UkfConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            process_model: Box::new(CtrvModel::new(config.thresholds.yaw_rate_epsilon)),
            radar_model: RadarModel::from(&config.radar)
                .with_min_range(config.thresholds.min_range),
            laser_model: LaserModel::from(&config.laser),
            weights: sigma_weights(LAMBDA),
            state: None,
            xsig_pred: None,
            config,
        })
    }

    /// Replaces the CTRV process model.
    pub fn with_process_model(mut self, model: Box<dyn ProcessModel>) -> Self {
        self.process_model = model;
        self
    }

    pub fn weights(&self) -> &SigmaWeights {
        &self.weights
    }

    pub fn state(&self) -> Option<&TrackState> {
        self.state.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn predicted_sigma_points(&self) -> Option<&PredictedSigmaPoints> {
        self.xsig_pred.as_ref()
    }

    /// Runs one full cycle for `record`: bootstrap on the first call,
    /// otherwise predict to the record's timestamp and fuse it.
    ///
    /// A numerical fault during prediction leaves state and timestamp
    /// untouched; a fault during the update leaves the predicted state.
    pub fn process_measurement(
        &mut self,
        record: &MeasurementRecord,
    ) -> Result<ProcessOutcome, FilterError> {
        let sensor = record.sensor();
        if !record.data.as_slice().iter().all(|v| v.is_finite()) {
            return Err(FilterError::NonFiniteMeasurement { sensor });
        }

        let previous_us = match &self.state {
            Some(state) => state.timestamp_us,
            None => {
                self.initialize(record)?;
                return Ok(ProcessOutcome::Initialized(sensor));
            }
        };

        // 1. Calculate the time delta since our last update.
        let elapsed_us = record
            .timestamp_us
            .checked_sub(previous_us)
            .ok_or(FilterError::OutOfOrder {
                previous_us,
                current_us: record.timestamp_us,
            })?;
        let dt = elapsed_us as f64 / 1.0e6;

        // 2. PREDICT: Advance the state to the exact time of the measurement.
        self.predict(dt)?;
        if let Some(state) = self.state.as_mut() {
            state.timestamp_us = record.timestamp_us;
        }

        // 3. UPDATE: Now that we're at the correct time, fuse the measurement.
        match &record.data {
            MeasurementData::Radar(z) if self.config.radar.enabled => {
                self.update_radar(z).map(ProcessOutcome::Updated)
            }
            MeasurementData::Laser(z) if self.config.laser.enabled => {
                self.update_laser(z).map(ProcessOutcome::Updated)
            }
            _ => {
                debug!(
                    %sensor,
                    timestamp_us = record.timestamp_us,
                    "sensor disabled, prediction only"
                );
                Ok(ProcessOutcome::Gated(sensor))
            }
        }
    }

    /// Seeds the state from a single record. The covariance starts as
    /// `diag(initial_variance)`, the identity by default.
    fn initialize(&mut self, record: &MeasurementRecord) -> Result<(), FilterError> {
        let mut x = StateVector::zeros();

        match &record.data {
            MeasurementData::Radar(z) => {
                let (rho, phi, rho_dot) = (z[0], z[1], z[2]);
                x[StateVariable::Px.index()] = rho * phi.cos();
                x[StateVariable::Py.index()] = rho * phi.sin();
                if self.config.radar_init == RadarInitPolicy::RadialVelocity {
                    // A closing target moves against the bearing.
                    let heading = if rho_dot < 0.0 { phi + PI } else { phi };
                    x[StateVariable::Speed.index()] = rho_dot.abs();
                    x[StateVariable::Yaw.index()] = wrap_angle(heading)?;
                }
            }
            MeasurementData::Laser(z) => {
                x[StateVariable::Px.index()] = z[0];
                x[StateVariable::Py.index()] = z[1];
            }
        }

        let covariance =
            StateCovariance::from_diagonal(&StateVector::from(self.config.initial_variance));
        let state = TrackState::new(x, covariance, record.timestamp_us);
        if !state.is_finite() {
            return Err(FilterError::NonFiniteState {
                stage: "initialization",
            });
        }

        debug!(
            sensor = %record.sensor(),
            timestamp_us = record.timestamp_us,
            px = x[0],
            py = x[1],
            "track initialized"
        );
        self.state = Some(state);
        self.xsig_pred = None;
        Ok(())
    }

    /// Predicts sigma points, the state, and the state covariance `dt`
    /// seconds ahead. The timestamp is not touched.
    pub fn predict(&mut self, dt: f64) -> Result<(), FilterError> {
        let state = self.state.as_mut().ok_or(FilterError::NotInitialized)?;

        // --- 1. Generate augmented sigma points ---
        let augmented = generate_augmented_sigma_points(
            &state.vector,
            &state.covariance,
            &self.config.process_noise,
            LAMBDA,
        )?;

        // --- 2. Propagate each point through the CTRV model ---
        let xsig_pred = propagate_sigma_points(self.process_model.as_ref(), &augmented, dt);

        // --- 3. Recover the predicted mean and covariance ---
        let (x_pred, p_pred) = predict_mean_and_covariance(&xsig_pred, &self.weights)?;
        if !x_pred.iter().chain(p_pred.iter()).all(|v| v.is_finite()) {
            return Err(FilterError::NonFiniteState { stage: "prediction" });
        }

        // --- 4. Commit ---
        state.vector = x_pred;
        state.covariance = p_pred;
        self.xsig_pred = Some(xsig_pred);
        Ok(())
    }

    /// Updates the state and the state covariance using a radar measurement
    /// `[range, bearing, range_rate]`.
    pub fn update_radar(&mut self, z: &Vector3<f64>) -> Result<Innovation, FilterError> {
        let stats = apply_update(
            &self.radar_model,
            &mut self.state,
            self.xsig_pred.as_ref(),
            &self.weights,
            z,
            self.config.thresholds.min_innovation_pivot,
        )?;
        Ok(Innovation::Radar(stats))
    }

    /// Updates the state and the state covariance using a laser measurement `[px, py]`.
    pub fn update_laser(&mut self, z: &Vector2<f64>) -> Result<Innovation, FilterError> {
        let stats = apply_update(
            &self.laser_model,
            &mut self.state,
            self.xsig_pred.as_ref(),
            &self.weights,
            z,
            self.config.thresholds.min_innovation_pivot,
        )?;
        Ok(Innovation::Laser(stats))
    }
}

/// Shared measurement update: transform, fuse, and commit only on success.
fn apply_update<const M: usize, Z>(
    model: &Z,
    state: &mut Option<TrackState>,
    xsig_pred: Option<&PredictedSigmaPoints>,
    weights: &SigmaWeights,
    z: &Observation<M>,
    min_pivot: f64,
) -> Result<InnovationStats<M>, FilterError>
where
    Z: MeasurementModel<M>,
{
    let state = state.as_mut().ok_or(FilterError::NotInitialized)?;
    let xsig_pred = xsig_pred.ok_or(FilterError::NoPrediction)?;

    let prediction = predict_measurement::<M, Z>(model, xsig_pred, weights)?;
    let correction = kalman_update(
        model,
        &state.vector,
        &state.covariance,
        xsig_pred,
        &prediction,
        weights,
        z,
        min_pivot,
    )?;

    if !correction
        .vector
        .iter()
        .chain(correction.covariance.iter())
        .all(|v| v.is_finite())
    {
        return Err(FilterError::NonFiniteState { stage: "update" });
    }

    trace!(
        sensor = %model.sensor(),
        nis = correction.innovation.nis,
        "measurement fused"
    );
    state.vector = correction.vector;
    state.covariance = correction.covariance;
    Ok(correction.innovation)
}

// --- The Public Trait Implementation ---
impl StateEstimator for UnscentedKalmanFilter {
    fn process(&mut self, record: &MeasurementRecord) -> Result<ProcessOutcome, FilterError> {
        self.process_measurement(record)
    }

    fn get_state(&self) -> Option<&TrackState> {
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SensorKind;
    use crate::types::AugmentedVector;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_4;

    fn filter() -> UnscentedKalmanFilter {
        UnscentedKalmanFilter::new(UkfConfig::default()).unwrap()
    }

    #[test]
    fn first_laser_record_bootstraps_the_track() {
        let mut ukf = filter();
        assert!(!ukf.is_initialized());

        let outcome = ukf
            .process_measurement(&MeasurementRecord::laser(1.0, 1.0, 0))
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Initialized(SensorKind::Laser));

        let state = ukf.state().unwrap();
        assert_eq!(state.vector, StateVector::new(1.0, 1.0, 0.0, 0.0, 0.0));
        assert_eq!(state.covariance, StateCovariance::identity());
        assert_eq!(state.timestamp_us, 0);
        assert!(ukf.predicted_sigma_points().is_none());
    }

    #[test]
    fn second_laser_record_blends_and_shrinks_uncertainty() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::laser(1.0, 1.0, 0))
            .unwrap();

        // Same filter, prediction only, to compare against.
        let mut predicted = ukf.clone();
        predicted.predict(0.1).unwrap();
        let prior = predicted.state().unwrap().clone();

        let outcome = ukf
            .process_measurement(&MeasurementRecord::laser(1.1, 1.05, 100_000))
            .unwrap();
        assert!(matches!(outcome, ProcessOutcome::Updated(Innovation::Laser(_))));

        let posterior = ukf.state().unwrap();
        assert_eq!(posterior.timestamp_us, 100_000);
        assert!(posterior.vector[0] > prior.vector[0] && posterior.vector[0] < 1.1);
        assert!(posterior.vector[1] > prior.vector[1] && posterior.vector[1] < 1.05);
        for i in 0..5 {
            assert!(
                posterior.covariance[(i, i)] <= prior.covariance[(i, i)] + 1e-12,
                "variance {i} grew"
            );
        }
    }

    #[test]
    fn radar_bootstrap_uses_radial_velocity() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::radar(2.0, FRAC_PI_4, -1.5, 0))
            .unwrap();
        let x = ukf.state().unwrap().vector;
        assert_abs_diff_eq!(x[0], 2.0 * FRAC_PI_4.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 2.0 * FRAC_PI_4.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(x[2], 1.5, epsilon = 1e-12);
        // Closing, so heading points back towards the sensor.
        assert_abs_diff_eq!(x[3], FRAC_PI_4 - PI, epsilon = 1e-12);
        assert_eq!(x[4], 0.0);
    }

    #[test]
    fn radar_bootstrap_can_start_at_rest() {
        let config = UkfConfig {
            radar_init: RadarInitPolicy::Stationary,
            ..UkfConfig::default()
        };
        let mut ukf = UnscentedKalmanFilter::new(config).unwrap();
        ukf.process_measurement(&MeasurementRecord::radar(2.0, 0.3, 4.0, 0))
            .unwrap();
        let x = ukf.state().unwrap().vector;
        assert_eq!(x[2], 0.0);
        assert_eq!(x[3], 0.0);
    }

    #[test]
    fn zero_range_radar_never_produces_nan() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::radar(0.0, 1.2, 0.0, 0))
            .unwrap();
        let outcome = ukf
            .process_measurement(&MeasurementRecord::radar(0.0, 0.4, 0.0, 50_000))
            .unwrap();
        assert!(matches!(outcome, ProcessOutcome::Updated(Innovation::Radar(_))));
        assert!(ukf.state().unwrap().is_finite());
    }

    #[test]
    fn zero_dt_prediction_keeps_the_belief() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::laser(3.0, -2.0, 10))
            .unwrap();
        let before = ukf.state().unwrap().clone();
        ukf.predict(0.0).unwrap();
        let after = ukf.state().unwrap();
        assert_abs_diff_eq!(after.vector, before.vector, epsilon = 1e-9);
        assert_abs_diff_eq!(after.covariance, before.covariance, epsilon = 1e-9);
    }

    /// Holds every point in place and ignores the noise samples.
    #[derive(Debug, Clone)]
    struct Frozen;

    impl ProcessModel for Frozen {
        fn propagate(&self, point: &AugmentedVector, _dt: f64) -> StateVector {
            point.fixed_rows::<5>(0).into_owned()
        }
    }

    #[test]
    fn replacement_process_model_drives_prediction() {
        let mut ukf = filter().with_process_model(Box::new(Frozen));
        ukf.process_measurement(&MeasurementRecord::radar(5.0, 0.3, 2.0, 0))
            .unwrap();
        let before = ukf.state().unwrap().clone();

        ukf.predict(1.0).unwrap();
        let after = ukf.state().unwrap();
        assert_abs_diff_eq!(after.vector, before.vector, epsilon = 1e-9);
        assert_abs_diff_eq!(after.covariance, before.covariance, epsilon = 1e-9);

        // The CTRV default moves a track with speed.
        let mut moving = filter();
        moving
            .process_measurement(&MeasurementRecord::radar(5.0, 0.3, 2.0, 0))
            .unwrap();
        moving.predict(1.0).unwrap();
        let moved = moving.state().unwrap().get(StateVariable::Px) - before.vector[0];
        assert!(moved > 0.5);
    }

    #[test]
    fn radar_track_behind_the_sensor_has_small_bearing_innovations() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::radar(10.0, PI, 0.0, 0))
            .unwrap();

        // A stationary target on the negative x axis, observed either side of ±π.
        for step in 1..=20_u64 {
            let bearing = if step % 2 == 0 { PI - 0.001 } else { -PI + 0.001 };
            let record = MeasurementRecord::radar(10.0, bearing, 0.0, step * 50_000);
            match ukf.process_measurement(&record).unwrap() {
                ProcessOutcome::Updated(Innovation::Radar(stats)) => {
                    assert!(
                        stats.residual[1].abs() < 0.05,
                        "step {step}: bearing innovation {}",
                        stats.residual[1]
                    );
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        let state = ukf.state().unwrap();
        assert!((state.get(StateVariable::Px) + 10.0).abs() < 0.5);
        assert!(state.get(StateVariable::Py).abs() < 0.5);
    }

    #[test]
    fn disabled_sensor_only_predicts() {
        let mut config = UkfConfig::default();
        config.radar.enabled = false;
        let mut ukf = UnscentedKalmanFilter::new(config).unwrap();

        // Initialization still accepts the disabled sensor.
        let first = ukf
            .process_measurement(&MeasurementRecord::radar(5.0, 0.2, 1.0, 0))
            .unwrap();
        assert_eq!(first, ProcessOutcome::Initialized(SensorKind::Radar));

        let mut predicted = ukf.clone();
        predicted.predict(0.2).unwrap();

        let outcome = ukf
            .process_measurement(&MeasurementRecord::radar(5.5, 0.25, 1.0, 200_000))
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Gated(SensorKind::Radar));
        assert_eq!(ukf.state().unwrap().vector, predicted.state().unwrap().vector);
        assert_eq!(ukf.state().unwrap().timestamp_us, 200_000);
    }

    #[test]
    fn out_of_order_record_is_rejected_without_side_effects() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::laser(1.0, 1.0, 500))
            .unwrap();
        let before = ukf.state().unwrap().clone();
        let err = ukf
            .process_measurement(&MeasurementRecord::laser(1.0, 1.0, 100))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::OutOfOrder {
                previous_us: 500,
                current_us: 100
            }
        );
        assert_eq!(ukf.state().unwrap(), &before);
    }

    #[test]
    fn non_finite_measurement_is_rejected() {
        let mut ukf = filter();
        let err = ukf
            .process_measurement(&MeasurementRecord::laser(f64::NAN, 1.0, 0))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::NonFiniteMeasurement {
                sensor: SensorKind::Laser
            }
        );
        assert!(!ukf.is_initialized());
    }

    #[test]
    fn predict_and_update_require_initialization() {
        let mut ukf = filter();
        assert_eq!(ukf.predict(0.1), Err(FilterError::NotInitialized));
        assert_eq!(
            ukf.update_laser(&Vector2::new(0.0, 0.0)),
            Err(FilterError::NotInitialized)
        );
    }

    #[test]
    fn update_requires_a_prediction() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::laser(1.0, 1.0, 0))
            .unwrap();
        assert_eq!(
            ukf.update_laser(&Vector2::new(1.0, 1.0)),
            Err(FilterError::NoPrediction)
        );
    }

    #[test]
    fn diverged_covariance_fails_prediction_and_keeps_state() {
        let mut ukf = filter();
        ukf.process_measurement(&MeasurementRecord::laser(1.0, 1.0, 0))
            .unwrap();
        if let Some(state) = ukf.state.as_mut() {
            state.covariance[(2, 2)] = -1.0;
        }
        let before = ukf.state().unwrap().clone();

        let err = ukf
            .process_measurement(&MeasurementRecord::laser(1.0, 1.0, 100_000))
            .unwrap_err();
        assert_eq!(err, FilterError::NotPositiveDefinite);
        assert_eq!(ukf.state().unwrap(), &before);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = UkfConfig::default();
        config.laser.std_px = -0.1;
        assert!(UnscentedKalmanFilter::new(config).is_err());
    }

    #[test]
    fn weights_are_fixed_at_construction() {
        let ukf = filter();
        assert_abs_diff_eq!(ukf.weights().sum(), 1.0, epsilon = 1e-9);
    }
}
