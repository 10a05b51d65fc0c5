// sigma_core/src/estimation/unscented.rs

//! The unscented transform as used by the CTRV filter: pushing sigma points
//! through the process and measurement models and recovering the moments.

use crate::error::FilterError;
use crate::models::estimation::dynamics::ProcessModel;
use crate::models::estimation::measurement::MeasurementModel;
use crate::state::StateVariable;
use crate::types::{
    AugmentedSigmaPoints, Observation, ObservationCovariance, ObservationSigmaPoints,
    PredictedSigmaPoints, SigmaWeights, StateCovariance, StateVector,
};
use crate::utils::angles::wrap_angle;

/// Propagates every augmented sigma point through the process model.
pub fn propagate_sigma_points(
    model: &dyn ProcessModel,
    augmented: &AugmentedSigmaPoints,
    dt: f64,
) -> PredictedSigmaPoints {
    let mut predicted = PredictedSigmaPoints::zeros();
    for (i, point) in augmented.column_iter().enumerate() {
        predicted.set_column(i, &model.propagate(&point.into_owned(), dt));
    }
    predicted
}

/// Difference between a state sigma point and the mean, angles wrapped.
pub fn state_residual(a: &StateVector, b: &StateVector) -> Result<StateVector, FilterError> {
    let mut diff = a - b;
    for var in StateVariable::LAYOUT.into_iter().filter(|v| v.is_angle()) {
        diff[var.index()] = wrap_angle(diff[var.index()])?;
    }
    Ok(diff)
}

/// Recombines propagated sigma points into the predicted mean and covariance.
pub fn predict_mean_and_covariance(
    sigma_points: &PredictedSigmaPoints,
    weights: &SigmaWeights,
) -> Result<(StateVector, StateCovariance), FilterError> {
    // Predicted mean: x = sum(w_i * X_i)
    let x = sigma_points * weights;

    // Predicted covariance: P = sum(w_i * (X_i - x) * (X_i - x)^T)
    let mut p = StateCovariance::zeros();
    for (i, point) in sigma_points.column_iter().enumerate() {
        let diff = state_residual(&point.into_owned(), &x)?;
        p += weights[i] * diff * diff.transpose();
    }

    Ok((x, symmetrize(p)))
}

/// Sigma points mapped into a sensor's observation space, with their moments.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementPrediction<const M: usize> {
    pub sigma_points: ObservationSigmaPoints<M>,
    /// Predicted observation `z_pred`.
    pub mean: Observation<M>,
    /// Innovation covariance `S`, including the sensor noise `R`.
    pub covariance: ObservationCovariance<M>,
}

/// Transforms the predicted sigma points into observation space and computes
/// the predicted observation and the innovation covariance `S`.
pub fn predict_measurement<const M: usize, Z>(
    model: &Z,
    sigma_points: &PredictedSigmaPoints,
    weights: &SigmaWeights,
) -> Result<MeasurementPrediction<M>, FilterError>
where
    Z: MeasurementModel<M> + ?Sized,
{
    let mut z_sigma = ObservationSigmaPoints::<M>::zeros();
    for (i, point) in sigma_points.column_iter().enumerate() {
        z_sigma.set_column(i, &model.predict_measurement(&point.into_owned()));
    }

    let z_pred = model.mean(&z_sigma, weights)?;

    let mut s = ObservationCovariance::<M>::zeros();
    for (i, z_point) in z_sigma.column_iter().enumerate() {
        let diff = model.residual(&z_point.into_owned(), &z_pred)?;
        s += weights[i] * diff * diff.transpose();
    }
    s += model.get_r();

    Ok(MeasurementPrediction {
        sigma_points: z_sigma,
        mean: z_pred,
        covariance: symmetrize(s),
    })
}

/// Tiny numerical errors can make a covariance slightly non-symmetric. This forces it.
pub(crate) fn symmetrize<const D: usize>(
    m: nalgebra::SMatrix<f64, D, D>,
) -> nalgebra::SMatrix<f64, D, D> {
    (m + m.transpose()) * 0.5
}
