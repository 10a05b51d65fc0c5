// sigma_core/src/types.rs

use nalgebra::{SMatrix, SVector};

// --- Core Dimensions ---
/// Length of the CTRV state vector `[px, py, v, yaw, yaw_rate]`.
pub const N_X: usize = 5;
/// State plus the two process-noise components (longitudinal and yaw acceleration).
pub const N_AUG: usize = N_X + 2;
/// Number of sigma points drawn from the augmented distribution.
pub const N_SIGMA: usize = 2 * N_AUG + 1;

// --- Core Type Aliases ---
pub type StateVector = SVector<f64, N_X>;
pub type StateCovariance = SMatrix<f64, N_X, N_X>;
pub type AugmentedVector = SVector<f64, N_AUG>;
pub type AugmentedCovariance = SMatrix<f64, N_AUG, N_AUG>;

/// Augmented sigma points, one per column.
pub type AugmentedSigmaPoints = SMatrix<f64, N_AUG, N_SIGMA>;
/// Sigma points after the process model, one per column.
pub type PredictedSigmaPoints = SMatrix<f64, N_X, N_SIGMA>;
/// Recombination weights, one per sigma point.
pub type SigmaWeights = SVector<f64, N_SIGMA>;

/// Observation vector of a sensor with `M` components.
pub type Observation<const M: usize> = SVector<f64, M>;
/// Observation-space covariance of a sensor with `M` components.
pub type ObservationCovariance<const M: usize> = SMatrix<f64, M, M>;
/// Sigma points mapped into a sensor's observation space.
pub type ObservationSigmaPoints<const M: usize> = SMatrix<f64, M, N_SIGMA>;
