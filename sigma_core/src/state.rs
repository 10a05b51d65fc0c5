// sigma_core/src/state.rs

use crate::types::{StateCovariance, StateVector};

/// Every slot of the CTRV state vector, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    /// X position in metres.
    Px,
    /// Y position in metres.
    Py,
    /// Speed magnitude along the heading, m/s.
    Speed,
    /// Heading angle in radians.
    Yaw,
    /// Heading rate in rad/s.
    YawRate,
}

impl StateVariable {
    /// The full layout of the state vector. The order defines the indices.
    pub const LAYOUT: [StateVariable; 5] = [
        StateVariable::Px,
        StateVariable::Py,
        StateVariable::Speed,
        StateVariable::Yaw,
        StateVariable::YawRate,
    ];

    pub const fn index(self) -> usize {
        match self {
            StateVariable::Px => 0,
            StateVariable::Py => 1,
            StateVariable::Speed => 2,
            StateVariable::Yaw => 3,
            StateVariable::YawRate => 4,
        }
    }

    /// Angular slots must be wrapped whenever a difference is taken.
    pub const fn is_angle(self) -> bool {
        matches!(self, StateVariable::Yaw)
    }
}

/// The filter's belief about the tracked object: mean, covariance and the
/// timestamp (microseconds) of the last measurement folded into it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// The state vector `x`.
    pub vector: StateVector,
    /// The covariance matrix `P`.
    pub covariance: StateCovariance,
    /// The timestamp of the last processed measurement, in microseconds.
    pub timestamp_us: u64,
}

impl TrackState {
    pub fn new(vector: StateVector, covariance: StateCovariance, timestamp_us: u64) -> Self {
        Self {
            vector,
            covariance,
            timestamp_us,
        }
    }

    pub fn get(&self, var: StateVariable) -> f64 {
        self.vector[var.index()]
    }

    /// Cartesian velocity `(vx, vy)` implied by speed and heading.
    pub fn velocity(&self) -> (f64, f64) {
        let v = self.get(StateVariable::Speed);
        let yaw = self.get(StateVariable::Yaw);
        (v * yaw.cos(), v * yaw.sin())
    }

    /// True when neither the mean nor the covariance holds NaN or infinity.
    pub fn is_finite(&self) -> bool {
        self.vector.iter().chain(self.covariance.iter()).all(|v| v.is_finite())
    }
}
