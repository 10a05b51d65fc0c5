// sigma_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::{ProcessOutcome, StateEstimator};
pub use crate::messages::{MeasurementData, MeasurementRecord, SensorKind};
pub use crate::models::estimation::dynamics::ProcessModel;
pub use crate::models::estimation::measurement::MeasurementModel;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{RadarInitPolicy, UkfConfig};
pub use crate::error::{ConfigError, FilterError};
pub use crate::state::{StateVariable, TrackState};
pub use crate::types::{StateCovariance, StateVector};

// --- Estimation Algorithms ---
pub use crate::estimation::filters::ukf::UnscentedKalmanFilter;
pub use crate::estimation::nis::{NisMonitor, NisStats};
pub use crate::estimation::update::{Innovation, InnovationStats};

// --- Concrete Model Implementations (Export common ones for convenience) ---
pub use crate::models::estimation::dynamics::ctrv::CtrvModel;
pub use crate::models::estimation::measurement::laser::LaserModel;
pub use crate::models::estimation::measurement::radar::RadarModel;
