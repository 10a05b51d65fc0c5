// sigma_sim/src/simulation/session.rs

//! One invocation of the runner: gather the logs, replay each through a fresh
//! filter, report and write the results.

use sigma_core::estimation::filters::ukf::UnscentedKalmanFilter;
use sigma_core::messages::SensorKind;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::Cli;
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::error::SimError;
use crate::simulation::core::topics::LoggedMeasurement;
use crate::simulation::io::{log_format, output};
use crate::simulation::runner::{replay, RunReport};
use crate::simulation::scenario;

/// The name used for the generated log in reports and output.
pub const SYNTHETIC_SOURCE: &str = "synthetic";

/// The result of replaying one log.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub source: String,
    pub report: RunReport,
}

/// Resolves `--input` into the logs to replay: the file itself, or every
/// `*.txt` below a directory, sorted by path.
pub fn discover_logs(input: &Path) -> Result<Vec<PathBuf>, SimError> {
    let metadata = std::fs::metadata(input).map_err(|e| SimError::io(input, e))?;
    if metadata.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut logs: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            !e.file_type().is_dir() && e.path().extension().map_or(false, |ext| ext == "txt")
        })
        .map(|e| e.into_path())
        .collect();
    logs.sort();

    if logs.is_empty() {
        warn!("No *.txt logs found under {:?}", input);
    }
    Ok(logs)
}

/// Replays one log through a filter built from `config`.
pub fn run_log(
    source: impl Into<String>,
    log: &[LoggedMeasurement],
    config: &ScenarioConfig,
) -> Result<RunSummary, SimError> {
    let mut ukf = UnscentedKalmanFilter::new(config.filter)?;
    let summary = RunSummary {
        source: source.into(),
        report: replay(&mut ukf, log),
    };
    log_summary(&summary);
    Ok(summary)
}

/// Runs everything `cli` asks for and returns one summary per log.
pub fn run_session(cli: &Cli, config: &ScenarioConfig) -> Result<Vec<RunSummary>, SimError> {
    let mut summaries = Vec::new();

    match &cli.input {
        Some(input) => {
            for path in discover_logs(input)? {
                info!("Replaying log: {:?}", path);
                let log = log_format::read_log(&path)?;
                summaries.push(run_log(path.display().to_string(), &log, config)?);
            }
        }
        None => {
            let log = scenario::generate(config)?;
            if let Some(path) = &cli.record {
                write_file(path, |w| log_format::write_log(w, &log))?;
                info!("Synthetic measurements written to {:?}", path);
            }
            summaries.push(run_log(SYNTHETIC_SOURCE, &log, config)?);
        }
    }

    if let Some(path) = &cli.output {
        write_file(path, |w| write_summaries(w, &summaries))?;
        info!("Estimates written to {:?}", path);
    }

    Ok(summaries)
}

/// Writes every run's estimates, each block preceded by a `# source` line.
pub fn write_summaries<W: Write>(writer: &mut W, summaries: &[RunSummary]) -> std::io::Result<()> {
    for summary in summaries {
        writeln!(writer, "# {}", summary.source)?;
        output::write_estimates(writer, &summary.report.rows)?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> Result<(), SimError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| SimError::io(path, e))
}

fn log_summary(summary: &RunSummary) {
    let report = &summary.report;
    info!(
        source = %summary.source,
        processed = report.processed(),
        skipped = report.skipped,
        gated = report.gated,
        "replay finished"
    );

    if let Some(rmse) = report.rmse.rmse() {
        info!(
            "RMSE px={:.4} py={:.4} vx={:.4} vy={:.4}",
            rmse[0], rmse[1], rmse[2], rmse[3]
        );
    }

    for sensor in [SensorKind::Laser, SensorKind::Radar] {
        let stats = report.nis.stats(sensor);
        if let (Some(mean), Some(above)) = (stats.mean(), stats.fraction_above_bound()) {
            info!(
                %sensor,
                samples = stats.samples,
                "NIS mean={:.3}, above 95% bound: {:.1}%",
                mean,
                above * 100.0
            );
        }
    }
}
