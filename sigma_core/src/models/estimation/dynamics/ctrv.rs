// sigma_core/src/models/estimation/dynamics/ctrv.rs

use crate::config::DEFAULT_YAW_RATE_EPSILON;
use crate::models::estimation::dynamics::ProcessModel;
use crate::types::{AugmentedVector, StateVector};

/// Constant Turn-Rate and Velocity motion.
///
/// Speed and yaw rate follow a random walk driven by the longitudinal and
/// yaw acceleration noise samples carried in the augmented state.
#[derive(Debug, Clone, Copy)]
pub struct CtrvModel {
    /// Below this absolute yaw rate the arc update is replaced by a straight line.
    pub yaw_rate_epsilon: f64,
}

impl Default for CtrvModel {
    fn default() -> Self {
        Self {
            yaw_rate_epsilon: DEFAULT_YAW_RATE_EPSILON,
        }
    }
}

impl CtrvModel {
    pub fn new(yaw_rate_epsilon: f64) -> Self {
        Self { yaw_rate_epsilon }
    }
}

impl ProcessModel for CtrvModel {
    fn propagate(&self, point: &AugmentedVector, dt: f64) -> StateVector {
        // --- Extract from the augmented point ---
        let p_x = point[0];
        let p_y = point[1];
        let v = point[2];
        let yaw = point[3];
        let yawd = point[4];
        let nu_a = point[5];
        let nu_yawdd = point[6];

        let (sin_yaw, cos_yaw) = yaw.sin_cos();

        // --- Deterministic part ---
        let (mut px_p, mut py_p) = if yawd.abs() > self.yaw_rate_epsilon {
            let yaw_end = yaw + yawd * dt;
            (
                p_x + v / yawd * (yaw_end.sin() - sin_yaw),
                p_y + v / yawd * (cos_yaw - yaw_end.cos()),
            )
        } else {
            (p_x + v * dt * cos_yaw, p_y + v * dt * sin_yaw)
        };
        let mut v_p = v;
        let mut yaw_p = yaw + yawd * dt;
        let mut yawd_p = yawd;

        // --- Noise contribution ---
        let half_dt2 = 0.5 * dt * dt;
        px_p += half_dt2 * nu_a * cos_yaw;
        py_p += half_dt2 * nu_a * sin_yaw;
        v_p += nu_a * dt;
        yaw_p += half_dt2 * nu_yawdd;
        yawd_p += nu_yawdd * dt;

        StateVector::new(px_p, py_p, v_p, yaw_p, yawd_p)
    }
}
