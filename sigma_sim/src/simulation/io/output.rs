// sigma_sim/src/simulation/io/output.rs

use sigma_core::state::StateVariable;
use std::io::Write;

use crate::simulation::runner::EstimateRow;

pub const HEADER: &str = concat!(
    "timestamp_us\tpx\tpy\tv\tyaw\tyaw_rate\tsensor\tmeas_px\tmeas_py\tnis",
    "\tgt_px\tgt_py\tgt_vx\tgt_vy"
);

/// Placeholder for a column with no value on this row.
const EMPTY: &str = "-";

/// Formats one estimate row (no trailing newline).
pub fn format_row(row: &EstimateRow) -> String {
    let state = &row.state;
    let mut columns = vec![state.timestamp_us.to_string()];
    columns.extend(
        StateVariable::LAYOUT
            .iter()
            .map(|&var| state.get(var).to_string()),
    );
    columns.push(row.sensor.to_string());
    columns.push(row.measured.0.to_string());
    columns.push(row.measured.1.to_string());
    columns.push(row.nis.map_or_else(|| EMPTY.to_string(), |nis| nis.to_string()));
    match &row.ground_truth {
        Some(truth) => columns.extend(truth.as_array().iter().map(|v| v.to_string())),
        None => columns.extend(std::iter::repeat(EMPTY.to_string()).take(4)),
    }
    columns.join("\t")
}

/// Writes the header followed by one line per row.
pub fn write_estimates<W: Write>(writer: &mut W, rows: &[EstimateRow]) -> std::io::Result<()> {
    writeln!(writer, "{HEADER}")?;
    for row in rows {
        writeln!(writer, "{}", format_row(row))?;
    }
    Ok(())
}
