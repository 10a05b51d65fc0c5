// sigma_sim/src/simulation/runner.rs

//! Replays a measurement log through any [`StateEstimator`].

use sigma_core::estimation::nis::NisMonitor;
use sigma_core::estimation::{ProcessOutcome, StateEstimator};
use sigma_core::messages::{MeasurementRecord, SensorKind};
use sigma_core::state::TrackState;
use tracing::warn;

use crate::simulation::core::topics::{GroundTruth, LoggedMeasurement};
use crate::simulation::evaluation::RmseAccumulator;

/// The estimate after one processed record.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRow {
    pub state: TrackState,
    pub sensor: SensorKind,
    /// The measured position in Cartesian form.
    pub measured: (f64, f64),
    /// NIS of the update, `None` on the bootstrap cycle or a gated sensor.
    pub nis: Option<f64>,
    pub ground_truth: Option<GroundTruth>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub rows: Vec<EstimateRow>,
    pub nis: NisMonitor,
    pub rmse: RmseAccumulator,
    /// Records rejected by the estimator. A failed prediction keeps the
    /// previous state; a failed update keeps the prediction to the record's time.
    pub skipped: usize,
    /// Records of a disabled sensor: predicted through, never fused.
    pub gated: usize,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.rows.len()
    }
}

/// Feeds every entry to `estimator` in order. A record that fails is logged
/// and skipped; the run carries on from whatever state the estimator kept.
pub fn replay<E>(estimator: &mut E, log: &[LoggedMeasurement]) -> RunReport
where
    E: StateEstimator + ?Sized,
{
    let mut report = RunReport::default();

    for entry in log {
        let record = &entry.record;
        let outcome = match estimator.process(record) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    sensor = %record.sensor(),
                    timestamp_us = record.timestamp_us,
                    error = %e,
                    "skipping measurement"
                );
                report.skipped += 1;
                continue;
            }
        };

        let nis = match &outcome {
            ProcessOutcome::Updated(innovation) => {
                report.nis.record(innovation);
                Some(innovation.nis())
            }
            ProcessOutcome::Gated(_) => {
                report.gated += 1;
                None
            }
            ProcessOutcome::Initialized(_) => None,
        };

        if let Some(state) = estimator.get_state() {
            if let Some(truth) = &entry.ground_truth {
                report.rmse.push(state, truth);
            }
            report.rows.push(row(state, record, nis, entry.ground_truth));
        }
    }

    report
}

fn row(
    state: &TrackState,
    record: &MeasurementRecord,
    nis: Option<f64>,
    ground_truth: Option<GroundTruth>,
) -> EstimateRow {
    EstimateRow {
        state: state.clone(),
        sensor: record.sensor(),
        measured: record.data.cartesian_position(),
        nis,
        ground_truth,
    }
}
