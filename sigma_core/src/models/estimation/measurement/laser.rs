// sigma_core/src/models/estimation/measurement/laser.rs

use nalgebra::{Matrix2, Vector2};

use crate::config::LaserConfig;
use crate::messages::SensorKind;
use crate::models::estimation::measurement::MeasurementModel;
use crate::state::StateVariable;
use crate::types::StateVector;

/// A position-only sensor: `z = [px, py]`.
#[derive(Debug, Clone)]
pub struct LaserModel {
    /// The 2x2 measurement noise covariance matrix, R.
    pub r_matrix: Matrix2<f64>,
}

impl LaserModel {
    pub fn new(std_px: f64, std_py: f64) -> Self {
        Self {
            r_matrix: Matrix2::from_diagonal(&Vector2::new(std_px.powi(2), std_py.powi(2))),
        }
    }
}

impl From<&LaserConfig> for LaserModel {
    fn from(config: &LaserConfig) -> Self {
        Self::new(config.std_px, config.std_py)
    }
}

impl MeasurementModel<2> for LaserModel {
    fn sensor(&self) -> SensorKind {
        SensorKind::Laser
    }

    fn get_r(&self) -> &Matrix2<f64> {
        &self.r_matrix
    }

    fn predict_measurement(&self, x: &StateVector) -> Vector2<f64> {
        Vector2::new(x[StateVariable::Px.index()], x[StateVariable::Py.index()])
    }
}
