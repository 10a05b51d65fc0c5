// sigma_core/src/models/estimation/measurement/mod.rs

use crate::error::FilterError;
use crate::messages::SensorKind;
use crate::types::{
    Observation, ObservationCovariance, ObservationSigmaPoints, SigmaWeights, StateVector,
};
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = h(x) + v`
pub trait MeasurementModel<const M: usize>: Debug + Send + Sync {
    /// The sensor this model describes.
    fn sensor(&self) -> SensorKind;

    /// Returns the additive measurement noise covariance matrix `R`.
    fn get_r(&self) -> &ObservationCovariance<M>;

    /// Maps one (predicted) state sigma point into observation space: `h(x)`.
    fn predict_measurement(&self, x: &StateVector) -> Observation<M>;

    /// Difference `a - b` in observation space. Models with angular
    /// components override this to take the shortest angular path.
    fn residual(
        &self,
        a: &Observation<M>,
        b: &Observation<M>,
    ) -> Result<Observation<M>, FilterError> {
        Ok(a - b)
    }

    /// Weighted mean of sigma points in observation space. Models with angular
    /// components override this so points straddling the wrap average correctly.
    fn mean(
        &self,
        sigma_points: &ObservationSigmaPoints<M>,
        weights: &SigmaWeights,
    ) -> Result<Observation<M>, FilterError> {
        Ok(sigma_points * weights)
    }
}

pub mod laser;
pub mod radar;
