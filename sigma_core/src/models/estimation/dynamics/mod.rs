// sigma_core/src/models/estimation/dynamics/mod.rs

use crate::types::{AugmentedVector, StateVector};
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A process model used inside the unscented filter.
///
/// Unlike an EKF model there is no Jacobian: the filter pushes every
/// augmented sigma point through `propagate` and recovers the statistics
/// afterwards. The last two components of the augmented point are the
/// process-noise samples `[nu_a, nu_yawdd]`.
pub trait ProcessModel: DynClone + Debug + Send + Sync {
    /// Advances one augmented sigma point by `dt` seconds and returns the
    /// propagated (non-augmented) state. The heading is left unwrapped.
    fn propagate(&self, point: &AugmentedVector, dt: f64) -> StateVector;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn ProcessModel>`.
dyn_clone::clone_trait_object!(ProcessModel);

pub mod ctrv;
