// sigma_sim/src/main.rs

use clap::Parser;
use sigma_sim::cli::Cli;
use sigma_sim::simulation::config::{load_scenario_config, render_scenario_config};
use sigma_sim::simulation::session::run_session;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = load_scenario_config(cli.config.as_deref())?;
    if cli.dump_config {
        print!("{}", render_scenario_config(&config)?);
        return Ok(());
    }

    run_session(&cli, &config)?;
    Ok(())
}

/// `RUST_LOG` takes precedence; otherwise the level follows `-v`.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
