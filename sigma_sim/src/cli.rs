use clap::Parser;
use std::path::PathBuf;

/// Sigma: replay radar/laser measurement logs through the unscented Kalman
/// filter, or generate and track a synthetic CTRV target.
///
/// This struct defines the command-line arguments accepted by the
/// `sigma_sim` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// A measurement log, or a directory searched recursively for `*.txt`
    /// logs. When omitted, a synthetic scenario is generated instead.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// The scenario TOML file. Missing keys fall back to their defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write the tab-separated estimates.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the generated synthetic measurements in log format.
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,

    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` wins.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The default log level implied by the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
