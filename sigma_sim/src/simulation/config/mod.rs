// sigma_sim/src/simulation/config/mod.rs

//! This module handles loading, validating and printing the scenario
//! configuration.

pub mod structs;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use crate::simulation::core::error::SimError;

// Re-export public types
pub use structs::{ScenarioConfig, SimulationConfig, TargetConfig};

/// Loads the scenario configuration. Keys missing from the file keep their
/// defaults; without a file the defaults are used as-is.
pub fn load_scenario_config(path: Option<&Path>) -> Result<ScenarioConfig, SimError> {
    let mut figment = Figment::from(Serialized::defaults(ScenarioConfig::default()));
    if let Some(path) = path {
        // `Toml::file` silently yields nothing for a missing file.
        if !path.is_file() {
            return Err(SimError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "configuration file not found"),
            ));
        }
        info!("Loading scenario configuration from: {:?}", path);
        figment = figment.merge(Toml::file(path));
    }
    let config: ScenarioConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Parses a configuration from TOML text, with the same defaults as
/// [`load_scenario_config`].
pub fn parse_scenario_config(toml: &str) -> Result<ScenarioConfig, SimError> {
    let config: ScenarioConfig = Figment::from(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::string(toml))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// The effective configuration as TOML, for `--dump-config`.
pub fn render_scenario_config(config: &ScenarioConfig) -> Result<String, SimError> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_core::config::RadarInitPolicy;

    #[test]
    fn empty_document_gives_defaults() {
        let config = parse_scenario_config("").unwrap();
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn partial_tables_override_only_their_keys() {
        let config = parse_scenario_config(
            r#"
            [filter]
            radar_init = "stationary"

            [filter.process_noise]
            std_a = 2.0

            [filter.laser]
            enabled = false

            [simulation]
            seed = 7

            [simulation.target]
            yaw_rate = -0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.filter.radar_init, RadarInitPolicy::Stationary);
        assert_eq!(config.filter.process_noise.std_a, 2.0);
        assert_eq!(config.filter.process_noise.std_yawdd, 1.0);
        assert!(!config.filter.laser.enabled);
        assert_eq!(config.filter.laser.std_px, 0.15);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.target.yaw_rate, -0.1);
        assert_eq!(config.simulation.target.speed, 5.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse_scenario_config("[filter.radar]\nstd_r = -1.0\n").unwrap_err();
        assert!(matches!(err, SimError::InvalidFilterConfig(_)));

        let err = parse_scenario_config("[simulation]\nstep_us = 0\n").unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidSimulation {
                name: "simulation.step_us",
                ..
            }
        ));
    }

    #[test]
    fn type_errors_surface_as_config_errors() {
        let err = parse_scenario_config("[simulation]\nseed = \"abc\"\n").unwrap_err();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn rendered_config_parses_back() {
        let mut config = ScenarioConfig::default();
        config.filter.radar.std_phi = 0.05;
        config.simulation.duration_s = 3.5;
        let text = render_scenario_config(&config).unwrap();
        assert_eq!(parse_scenario_config(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_scenario_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}
