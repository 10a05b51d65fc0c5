// sigma_core/src/estimation/sigma_points.rs

use nalgebra::Cholesky;

use crate::config::ProcessNoise;
use crate::error::FilterError;
use crate::types::{
    AugmentedCovariance, AugmentedSigmaPoints, AugmentedVector, SigmaWeights, StateCovariance,
    StateVector, N_AUG, N_X,
};

/// Sigma point spreading parameter, `λ = 3 - n_aug`.
pub const LAMBDA: f64 = 3.0 - N_AUG as f64;

/// Weights for recombining the `2·n_aug + 1` sigma points.
///
/// The central weight is `λ / (λ + n_aug)`, the rest share `1 / (2(λ + n_aug))`,
/// so the weights sum to one for any `λ ≠ -n_aug`.
pub fn sigma_weights(lambda: f64) -> SigmaWeights {
    let n = N_AUG as f64;
    let mut weights = SigmaWeights::from_element(0.5 / (lambda + n));
    weights[0] = lambda / (lambda + n);
    weights
}

/// `[x; 0; 0]`: the process-noise components are zero-mean.
pub fn augmented_mean(x: &StateVector) -> AugmentedVector {
    let mut x_aug = AugmentedVector::zeros();
    x_aug.fixed_rows_mut::<N_X>(0).copy_from(x);
    x_aug
}

/// Block diagonal `[P, 0; 0, diag(σ_a², σ_yawdd²)]`.
pub fn augmented_covariance(p: &StateCovariance, noise: &ProcessNoise) -> AugmentedCovariance {
    let mut p_aug = AugmentedCovariance::zeros();
    p_aug.fixed_view_mut::<N_X, N_X>(0, 0).copy_from(p);
    p_aug[(N_X, N_X)] = noise.std_a.powi(2);
    p_aug[(N_X + 1, N_X + 1)] = noise.std_yawdd.powi(2);
    p_aug
}

/// Generates the augmented sigma points, one per column.
///
/// Column 0 is the augmented mean, columns `1..=n_aug` step along the scaled
/// Cholesky factor and columns `n_aug+1..` step against it. Fails when the
/// augmented covariance has no Cholesky factor (not positive definite).
pub fn generate_augmented_sigma_points(
    x: &StateVector,
    p: &StateCovariance,
    noise: &ProcessNoise,
    lambda: f64,
) -> Result<AugmentedSigmaPoints, FilterError> {
    let x_aug = augmented_mean(x);
    let p_aug = augmented_covariance(p, noise);

    // Cholesky decomposition: P_aug = L * L^T
    let l_matrix = Cholesky::new(p_aug)
        .ok_or(FilterError::NotPositiveDefinite)?
        .l();
    let scaled_l = l_matrix * (lambda + N_AUG as f64).sqrt();

    let mut sigma_points = AugmentedSigmaPoints::zeros();
    sigma_points.set_column(0, &x_aug);
    for i in 0..N_AUG {
        sigma_points.set_column(i + 1, &(x_aug + scaled_l.column(i)));
        sigma_points.set_column(i + 1 + N_AUG, &(x_aug - scaled_l.column(i)));
    }

    Ok(sigma_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::N_SIGMA;
    use approx::assert_abs_diff_eq;

    fn sample_covariance() -> StateCovariance {
        // Lower-triangular factor with a positive diagonal, so L * L^T is SPD.
        let l = StateCovariance::new(
            0.8, 0.0, 0.0, 0.0, 0.0, //
            0.1, 0.6, 0.0, 0.0, 0.0, //
            -0.2, 0.05, 1.1, 0.0, 0.0, //
            0.0, 0.3, 0.1, 0.4, 0.0, //
            0.05, -0.1, 0.0, 0.2, 0.3,
        );
        l * l.transpose()
    }

    #[test]
    fn weights_sum_to_one() {
        for &lambda in &[LAMBDA, 0.0, 1.0, -2.5, 10.0] {
            assert_abs_diff_eq!(sigma_weights(lambda).sum(), 1.0, epsilon = 1e-9);
        }
        let w = sigma_weights(LAMBDA);
        assert_abs_diff_eq!(w[0], -4.0 / 3.0, epsilon = 1e-12);
        for i in 1..N_SIGMA {
            assert_abs_diff_eq!(w[i], 1.0 / 6.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn augmented_covariance_is_block_diagonal() {
        let p = sample_covariance();
        let noise = ProcessNoise {
            std_a: 0.5,
            std_yawdd: 2.0,
        };
        let p_aug = augmented_covariance(&p, &noise);
        assert_eq!(p_aug.fixed_view::<N_X, N_X>(0, 0), p);
        assert_abs_diff_eq!(p_aug[(5, 5)], 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(p_aug[(6, 6)], 4.0, epsilon = 1e-15);
        assert_eq!(p_aug[(5, 6)], 0.0);
        assert_eq!(p_aug[(0, 6)], 0.0);
    }

    #[test]
    fn sigma_points_reproduce_mean_and_covariance() {
        let x = StateVector::new(1.0, -2.0, 3.5, 0.4, 0.1);
        let p = sample_covariance();
        let noise = ProcessNoise::default();
        let points = generate_augmented_sigma_points(&x, &p, &noise, LAMBDA).unwrap();
        let weights = sigma_weights(LAMBDA);

        let x_aug = augmented_mean(&x);
        let mean = points * weights;
        assert_abs_diff_eq!(mean, x_aug, epsilon = 1e-9);

        let mut cov = AugmentedCovariance::zeros();
        for (i, col) in points.column_iter().enumerate() {
            let diff = col - x_aug;
            cov += weights[i] * diff * diff.transpose();
        }
        assert_abs_diff_eq!(cov, augmented_covariance(&p, &noise), epsilon = 1e-9);
    }

    #[test]
    fn sigma_points_are_symmetric_about_the_mean() {
        let x = StateVector::new(0.5, 0.5, 1.0, -0.3, 0.0);
        let p = StateCovariance::identity();
        let points =
            generate_augmented_sigma_points(&x, &p, &ProcessNoise::default(), LAMBDA).unwrap();
        let x_aug = augmented_mean(&x);
        for i in 0..N_AUG {
            let plus = points.column(i + 1) - x_aug;
            let minus = points.column(i + 1 + N_AUG) - x_aug;
            assert_abs_diff_eq!(plus, -minus, epsilon = 1e-12);
        }
    }

    #[test]
    fn indefinite_covariance_is_reported() {
        let mut p = StateCovariance::identity();
        p[(2, 2)] = -1.0;
        let result = generate_augmented_sigma_points(
            &StateVector::zeros(),
            &p,
            &ProcessNoise::default(),
            LAMBDA,
        );
        assert_eq!(result, Err(FilterError::NotPositiveDefinite));
    }

    #[test]
    fn nan_covariance_is_reported() {
        let mut p = StateCovariance::identity();
        p[(0, 0)] = f64::NAN;
        let result = generate_augmented_sigma_points(
            &StateVector::zeros(),
            &p,
            &ProcessNoise::default(),
            LAMBDA,
        );
        assert_eq!(result, Err(FilterError::NotPositiveDefinite));
    }
}
