// sigma_core/src/utils/angles.rs

use std::f64::consts::{PI, TAU};

use crate::error::FilterError;

/// Wraps an angle into `(-π, π]` in closed form.
///
/// `π` maps to itself and `-π` maps to `π`. Non-finite input is rejected
/// instead of being passed through as NaN.
pub fn wrap_angle(theta: f64) -> Result<f64, FilterError> {
    if !theta.is_finite() {
        return Err(FilterError::NonFiniteAngle(theta));
    }
    Ok(PI - (PI - theta).rem_euclid(TAU))
}

/// Shortest signed angular distance from `b` to `a`.
pub fn angle_diff(a: f64, b: f64) -> Result<f64, FilterError> {
    wrap_angle(a - b)
}
