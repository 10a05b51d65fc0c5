// sigma_sim/src/prelude.rs

// Re-export the entire sigma_core prelude so you can easily access
// pure types like `MeasurementRecord`, `UkfConfig`, `TrackState`, etc.
pub use sigma_core::prelude::*;

// Re-export common runner-specific types for easy access in other modules.
pub use crate::simulation::config::{ScenarioConfig, SimulationConfig, TargetConfig};
pub use crate::simulation::core::error::{LogParseError, SimError};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::topics::{GroundTruth, LoggedMeasurement};
pub use crate::simulation::evaluation::RmseAccumulator;
pub use crate::simulation::runner::{replay, EstimateRow, RunReport};
