// sigma_core/src/messages.rs

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Sensor Identification ==
// =========================================================================

/// The kinds of sensor the filter knows how to fuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Range, bearing and range-rate.
    Radar,
    /// Cartesian position only.
    Laser,
}

impl SensorKind {
    /// Number of components in one observation from this sensor.
    pub const fn dim(self) -> usize {
        match self {
            SensorKind::Radar => 3,
            SensorKind::Laser => 2,
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Radar => f.write_str("radar"),
            SensorKind::Laser => f.write_str("laser"),
        }
    }
}

// =========================================================================
// == Core Message and Data Enums ==
// =========================================================================

/// A raw observation, tagged with the sensor that produced it.
#[derive(Clone, Debug, PartialEq)]
pub enum MeasurementData {
    /// `[range (m), bearing (rad), range_rate (m/s)]`
    Radar(Vector3<f64>),
    /// `[px (m), py (m)]`
    Laser(Vector2<f64>),
}

impl MeasurementData {
    pub fn sensor(&self) -> SensorKind {
        match self {
            MeasurementData::Radar(_) => SensorKind::Radar,
            MeasurementData::Laser(_) => SensorKind::Laser,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        match self {
            MeasurementData::Radar(z) => z.as_slice(),
            MeasurementData::Laser(z) => z.as_slice(),
        }
    }

    /// The observed position in Cartesian coordinates.
    pub fn cartesian_position(&self) -> (f64, f64) {
        match self {
            MeasurementData::Radar(z) => (z[0] * z[1].cos(), z[0] * z[1].sin()),
            MeasurementData::Laser(z) => (z[0], z[1]),
        }
    }
}

/// One measurement as delivered by the input layer. Timestamps are in
/// microseconds and must be non-decreasing across calls.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementRecord {
    pub timestamp_us: u64,
    pub data: MeasurementData,
}

impl MeasurementRecord {
    pub fn radar(range: f64, bearing: f64, range_rate: f64, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Radar(Vector3::new(range, bearing, range_rate)),
        }
    }

    pub fn laser(px: f64, py: f64, timestamp_us: u64) -> Self {
        Self {
            timestamp_us,
            data: MeasurementData::Laser(Vector2::new(px, py)),
        }
    }

    pub fn sensor(&self) -> SensorKind {
        self.data.sensor()
    }
}
