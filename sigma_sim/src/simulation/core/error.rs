// sigma_sim/src/simulation/core/error.rs

use sigma_core::error::{ConfigError, FilterError};
use std::path::PathBuf;
use thiserror::Error;

/// A malformed line in a measurement log.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("line {line}: {reason}")]
pub struct LogParseError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

impl LogParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Everything that can stop the runner.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed log {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: LogParseError,
    },

    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("failed to render configuration: {0}")]
    RenderConfig(#[from] toml::ser::Error),

    #[error(transparent)]
    InvalidFilterConfig(#[from] ConfigError),

    #[error("invalid simulation parameter `{name}`: {value}")]
    InvalidSimulation { name: &'static str, value: f64 },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

impl SimError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
