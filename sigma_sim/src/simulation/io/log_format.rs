// sigma_sim/src/simulation/io/log_format.rs

//! The whitespace-separated measurement log format:
//!
//! ```text
//! L  px  py           timestamp_us  [gt_px gt_py gt_vx gt_vy ...]
//! R  rho phi rho_dot  timestamp_us  [gt_px gt_py gt_vx gt_vy ...]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Ground-truth columns
//! are optional; anything after the first four of them is ignored.

use sigma_core::messages::{MeasurementData, MeasurementRecord};
use std::io::Write;
use std::path::Path;

use crate::simulation::core::error::{LogParseError, SimError};
use crate::simulation::core::topics::{GroundTruth, LoggedMeasurement};

const GROUND_TRUTH_COLUMNS: usize = 4;

/// Reads and parses a whole log file.
pub fn read_log(path: &Path) -> Result<Vec<LoggedMeasurement>, SimError> {
    let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    parse_log(&text).map_err(|source| SimError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_log(text: &str) -> Result<Vec<LoggedMeasurement>, LogParseError> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line, index + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Parses one line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<LoggedMeasurement>, LogParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut fields = line.split_whitespace();
    let tag = fields.next().unwrap_or_default();
    let columns = match tag {
        "L" => 2,
        "R" => 3,
        other => {
            return Err(LogParseError::new(
                line_no,
                format!("unknown sensor tag `{other}`"),
            ))
        }
    };

    let mut values = [0.0; 3];
    for (i, slot) in values.iter_mut().take(columns).enumerate() {
        let field = fields.next().ok_or_else(|| {
            LogParseError::new(line_no, format!("expected {columns} measurement values, got {i}"))
        })?;
        *slot = parse_f64(field, line_no)?;
    }

    let timestamp = fields
        .next()
        .ok_or_else(|| LogParseError::new(line_no, "missing timestamp"))?;
    let timestamp_us: u64 = timestamp
        .parse()
        .map_err(|_| LogParseError::new(line_no, format!("invalid timestamp `{timestamp}`")))?;

    let record = match tag {
        "L" => MeasurementRecord::laser(values[0], values[1], timestamp_us),
        _ => MeasurementRecord::radar(values[0], values[1], values[2], timestamp_us),
    };

    let truth: Vec<f64> = fields
        .take(GROUND_TRUTH_COLUMNS)
        .map(|field| parse_f64(field, line_no))
        .collect::<Result<_, _>>()?;
    let ground_truth = match truth.as_slice() {
        [] => None,
        [px, py, vx, vy] => Some(GroundTruth {
            px: *px,
            py: *py,
            vx: *vx,
            vy: *vy,
        }),
        partial => {
            return Err(LogParseError::new(
                line_no,
                format!(
                    "expected {GROUND_TRUTH_COLUMNS} ground-truth values, got {}",
                    partial.len()
                ),
            ))
        }
    };

    Ok(Some(LoggedMeasurement::new(record, ground_truth)))
}

fn parse_f64(field: &str, line_no: usize) -> Result<f64, LogParseError> {
    field
        .parse()
        .map_err(|_| LogParseError::new(line_no, format!("invalid number `{field}`")))
}

/// Formats one entry as a log line (no trailing newline).
pub fn format_line(entry: &LoggedMeasurement) -> String {
    let record = &entry.record;
    let mut line = match &record.data {
        MeasurementData::Laser(z) => format!("L\t{}\t{}\t{}", z[0], z[1], record.timestamp_us),
        MeasurementData::Radar(z) => format!(
            "R\t{}\t{}\t{}\t{}",
            z[0], z[1], z[2], record.timestamp_us
        ),
    };
    if let Some(truth) = &entry.ground_truth {
        for value in truth.as_array() {
            line.push('\t');
            line.push_str(&value.to_string());
        }
    }
    line
}

pub fn write_log<W: Write>(writer: &mut W, entries: &[LoggedMeasurement]) -> std::io::Result<()> {
    for entry in entries {
        writeln!(writer, "{}", format_line(entry))?;
    }
    Ok(())
}
