// sigma_sim/src/simulation/evaluation.rs

use nalgebra::Vector4;
use sigma_core::state::{StateVariable, TrackState};

use crate::simulation::core::topics::GroundTruth;

/// Running root-mean-square error over `[px, py, vx, vy]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RmseAccumulator {
    sum_sq: Vector4<f64>,
    count: usize,
}

impl RmseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the error between an estimate and the truth at the same instant.
    pub fn push(&mut self, estimate: &TrackState, truth: &GroundTruth) {
        let (vx, vy) = estimate.velocity();
        let estimate = Vector4::new(
            estimate.get(StateVariable::Px),
            estimate.get(StateVariable::Py),
            vx,
            vy,
        );
        let error = estimate - Vector4::from(truth.as_array());
        self.sum_sq += error.component_mul(&error);
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` until at least one pair has been pushed.
    pub fn rmse(&self) -> Option<Vector4<f64>> {
        (self.count > 0).then(|| (self.sum_sq / self.count as f64).map(f64::sqrt))
    }
}
