// sigma_core/src/models/estimation/measurement/radar.rs

use nalgebra::{Matrix3, Vector3};

use crate::config::{RadarConfig, DEFAULT_MIN_RANGE};
use crate::error::FilterError;
use crate::messages::SensorKind;
use crate::models::estimation::measurement::MeasurementModel;
use crate::types::{ObservationSigmaPoints, SigmaWeights, StateVector};
use crate::utils::angles::wrap_angle;

/// A range/bearing/range-rate sensor at the origin.
///
/// `z = [sqrt(px² + py²), atan2(py, px), (px·vx + py·vy) / range]`
#[derive(Debug, Clone)]
pub struct RadarModel {
    /// The 3x3 measurement noise covariance matrix, R.
    pub r_matrix: Matrix3<f64>,
    /// Lower bound on the range-rate denominator. Points closer to the
    /// sensor than this are treated as being at this range.
    pub min_range: f64,
}

impl RadarModel {
    pub fn new(std_r: f64, std_phi: f64, std_rd: f64) -> Self {
        Self {
            r_matrix: Matrix3::from_diagonal(&Vector3::new(
                std_r.powi(2),
                std_phi.powi(2),
                std_rd.powi(2),
            )),
            min_range: DEFAULT_MIN_RANGE,
        }
    }

    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }
}

impl From<&RadarConfig> for RadarModel {
    fn from(config: &RadarConfig) -> Self {
        Self::new(config.std_r, config.std_phi, config.std_rd)
    }
}

impl MeasurementModel<3> for RadarModel {
    fn sensor(&self) -> SensorKind {
        SensorKind::Radar
    }

    fn get_r(&self) -> &Matrix3<f64> {
        &self.r_matrix
    }

    fn predict_measurement(&self, x: &StateVector) -> Vector3<f64> {
        let p_x = x[0];
        let p_y = x[1];
        let v = x[2];
        let yaw = x[3];

        let v1 = yaw.cos() * v;
        let v2 = yaw.sin() * v;

        let range = p_x.hypot(p_y);
        // atan2(0, 0) is 0, so only the range-rate needs the clamp.
        let bearing = p_y.atan2(p_x);
        let range_rate = (p_x * v1 + p_y * v2) / range.max(self.min_range);

        Vector3::new(range, bearing, range_rate)
    }

    fn residual(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Result<Vector3<f64>, FilterError> {
        let mut diff = a - b;
        diff[1] = wrap_angle(diff[1])?;
        Ok(diff)
    }

    /// Averages residuals about the first sigma point, so bearings on either
    /// side of ±π meet near π instead of cancelling out to 0.
    fn mean(
        &self,
        sigma_points: &ObservationSigmaPoints<3>,
        weights: &SigmaWeights,
    ) -> Result<Vector3<f64>, FilterError> {
        let reference = sigma_points.column(0).into_owned();
        let mut offset = Vector3::zeros();
        for (i, point) in sigma_points.column_iter().enumerate() {
            offset += weights[i] * self.residual(&point.into_owned(), &reference)?;
        }
        // Weights sum to one, so range and range-rate keep their linear mean.
        let mut mean = reference + offset;
        mean[1] = wrap_angle(mean[1])?;
        Ok(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::sigma_points::{sigma_weights, LAMBDA};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_4, PI};

    #[test]
    fn radial_motion_has_full_range_rate() {
        let model = RadarModel::new(0.3, 0.03, 0.3);
        let z = model.predict_measurement(&StateVector::new(3.0, 3.0, 2.0, FRAC_PI_4, 0.0));
        assert_abs_diff_eq!(z[0], 18.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(z[1], FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(z[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tangential_motion_has_zero_range_rate() {
        let model = RadarModel::new(0.3, 0.03, 0.3);
        let z = model.predict_measurement(&StateVector::new(5.0, 0.0, 4.0, PI / 2.0, 0.0));
        assert_abs_diff_eq!(z[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn origin_does_not_produce_nan() {
        let model = RadarModel::new(0.3, 0.03, 0.3);
        let z = model.predict_measurement(&StateVector::new(0.0, 0.0, 3.0, 1.0, 0.5));
        assert!(z.iter().all(|v| v.is_finite()));
        assert_eq!(z, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn close_points_use_clamped_denominator() {
        let model = RadarModel::new(0.3, 0.03, 0.3).with_min_range(0.1);
        let z = model.predict_measurement(&StateVector::new(0.01, 0.0, 1.0, 0.0, 0.0));
        assert_abs_diff_eq!(z[2], 0.01 / 0.1, epsilon = 1e-12);
    }

    #[test]
    fn bearing_residual_wraps() {
        let model = RadarModel::new(0.3, 0.03, 0.3);
        let a = Vector3::new(1.0, PI - 0.05, 0.0);
        let b = Vector3::new(1.0, -PI + 0.05, 0.0);
        let r = model.residual(&a, &b).unwrap();
        assert_abs_diff_eq!(r[1], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn bearing_mean_straddling_pi_stays_near_pi() {
        let model = RadarModel::new(0.3, 0.03, 0.3);
        let weights = sigma_weights(LAMBDA);

        // Half the spread points cross over to -π, the other half stay below π.
        let centre = PI - 0.01;
        let mut points = ObservationSigmaPoints::<3>::zeros();
        points.set_column(0, &Vector3::new(10.0, centre, 1.0));
        for i in 1..=7 {
            points.set_column(i, &Vector3::new(10.5, centre + 0.05 - 2.0 * PI, 1.2));
            points.set_column(i + 7, &Vector3::new(9.5, centre - 0.05, 0.8));
        }

        let mean = model.mean(&points, &weights).unwrap();
        assert_abs_diff_eq!(mean[0], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mean[1], centre, epsilon = 1e-9);
        assert_abs_diff_eq!(mean[2], 1.0, epsilon = 1e-9);

        // The plain weighted sum lands on the wrong side of the circle.
        let naive = points * weights;
        assert!(naive[1] < 0.0);
    }
}
