// sigma_core/src/estimation/update.rs

use nalgebra::{Cholesky, SMatrix};

use crate::error::FilterError;
use crate::estimation::unscented::{state_residual, symmetrize, MeasurementPrediction};
use crate::messages::SensorKind;
use crate::models::estimation::measurement::MeasurementModel;
use crate::types::{
    Observation, ObservationCovariance, PredictedSigmaPoints, SigmaWeights, StateCovariance,
    StateVector, N_X,
};

/// Innovation `y = z - z_pred`, its covariance `S` and the Normalized
/// Innovation Squared `y' S⁻¹ y` of one update.
#[derive(Debug, Clone, PartialEq)]
pub struct InnovationStats<const M: usize> {
    pub residual: Observation<M>,
    pub covariance: ObservationCovariance<M>,
    pub nis: f64,
}

/// The innovation of an update, tagged by sensor.
#[derive(Debug, Clone, PartialEq)]
pub enum Innovation {
    Radar(InnovationStats<3>),
    Laser(InnovationStats<2>),
}

impl Innovation {
    pub fn sensor(&self) -> SensorKind {
        match self {
            Innovation::Radar(_) => SensorKind::Radar,
            Innovation::Laser(_) => SensorKind::Laser,
        }
    }

    pub fn nis(&self) -> f64 {
        match self {
            Innovation::Radar(stats) => stats.nis,
            Innovation::Laser(stats) => stats.nis,
        }
    }
}

/// The corrected belief produced by one measurement update.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction<const M: usize> {
    pub vector: StateVector,
    pub covariance: StateCovariance,
    pub innovation: InnovationStats<M>,
}

/// Cross-correlation `Tc = sum(w_i * (X_i - x)(Z_i - z_pred)^T)`.
pub fn cross_correlation<const M: usize, Z>(
    model: &Z,
    x_sigma: &PredictedSigmaPoints,
    x_pred: &StateVector,
    prediction: &MeasurementPrediction<M>,
    weights: &SigmaWeights,
) -> Result<SMatrix<f64, N_X, M>, FilterError>
where
    Z: MeasurementModel<M> + ?Sized,
{
    let mut t_cov = SMatrix::<f64, N_X, M>::zeros();
    for (i, (x_point, z_point)) in x_sigma
        .column_iter()
        .zip(prediction.sigma_points.column_iter())
        .enumerate()
    {
        let x_diff = state_residual(&x_point.into_owned(), x_pred)?;
        let z_diff = model.residual(&z_point.into_owned(), &prediction.mean)?;
        t_cov += weights[i] * x_diff * z_diff.transpose();
    }
    Ok(t_cov)
}

/// Fuses the observation `z` into the predicted belief `(x, P)`.
///
/// `S` is factored with Cholesky; a failed factorization or a squared pivot
/// at or below `min_pivot` is reported as a singular innovation instead of
/// letting a NaN-filled gain through. Nothing is written back here, the
/// caller decides whether to commit the returned correction.
#[allow(clippy::too_many_arguments)]
pub fn kalman_update<const M: usize, Z>(
    model: &Z,
    x: &StateVector,
    p: &StateCovariance,
    x_sigma: &PredictedSigmaPoints,
    prediction: &MeasurementPrediction<M>,
    weights: &SigmaWeights,
    z: &Observation<M>,
    min_pivot: f64,
) -> Result<Correction<M>, FilterError>
where
    Z: MeasurementModel<M> + ?Sized,
{
    let singular = FilterError::SingularInnovation {
        sensor: model.sensor(),
    };

    let s_cov = prediction.covariance;
    let cholesky = Cholesky::new(s_cov).ok_or_else(|| singular.clone())?;
    let smallest_pivot = cholesky
        .l_dirty()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, &d| acc.min(d));
    if smallest_pivot.is_nan() || smallest_pivot * smallest_pivot <= min_pivot {
        return Err(singular);
    }
    let s_inv = cholesky.inverse();

    // --- Kalman gain ---
    let t_cov = cross_correlation(model, x_sigma, x, prediction, weights)?;
    let k_gain = t_cov * s_inv;

    // --- Correct state and covariance ---
    let y = model.residual(z, &prediction.mean)?;
    let vector = x + k_gain * y;
    let covariance = symmetrize(p - k_gain * s_cov * k_gain.transpose());
    let nis = y.dot(&(s_inv * y));

    Ok(Correction {
        vector,
        covariance,
        innovation: InnovationStats {
            residual: y,
            covariance: s_cov,
            nis,
        },
    })
}
