// sigma_sim/src/simulation/core/topics.rs

use serde::{Deserialize, Serialize};
use sigma_core::messages::MeasurementRecord;

/// The true kinematic state of the target at a measurement's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
}

impl GroundTruth {
    pub fn as_array(&self) -> [f64; 4] {
        [self.px, self.py, self.vx, self.vy]
    }
}

/// One log entry: the measurement handed to the filter and, when the log
/// carries it, the truth it was sampled from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMeasurement {
    pub record: MeasurementRecord,
    pub ground_truth: Option<GroundTruth>,
}

impl LoggedMeasurement {
    pub fn new(record: MeasurementRecord, ground_truth: Option<GroundTruth>) -> Self {
        Self {
            record,
            ground_truth,
        }
    }
}
