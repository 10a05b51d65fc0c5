// sigma_core/src/estimation/mod.rs

use crate::error::FilterError;
use crate::messages::{MeasurementRecord, SensorKind};
use crate::state::TrackState;

pub use update::Innovation;

/// What a single call to [`StateEstimator::process`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// First record: the state was seeded from it, no update was applied.
    Initialized(SensorKind),
    /// The state was predicted to the record's time and corrected by it.
    Updated(Innovation),
    /// The sensor is disabled: the state was predicted but not corrected.
    Gated(SensorKind),
}

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of a single tracked object.
pub trait StateEstimator: Send + Sync {
    /// Folds one measurement into the estimate. Records must arrive in
    /// non-decreasing timestamp order.
    fn process(&mut self, record: &MeasurementRecord) -> Result<ProcessOutcome, FilterError>;

    /// Returns the current best estimate, or `None` before the first record.
    fn get_state(&self) -> Option<&TrackState>;
}

pub mod filters;
pub mod nis;
pub mod sigma_points;
pub mod unscented;
pub mod update;
