//! Configuration resolution.
//!
//! Resolution order for the training data path: CLI argument →
//! environment variable → builtin default. The source is kept for
//! diagnostics so `fit`/`predict` output can say where the path came
//! from.

use std::path::PathBuf;

/// Environment variable naming the training CSV.
pub const ENV_TRAIN_DATA: &str = "DQ_TRAIN_DATA";

/// Default training table location.
const DEFAULT_TRAIN_DATA: &str = "train.csv";

/// Where a configuration value was found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Using the builtin default.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the training CSV.
    pub train_data: PathBuf,

    /// Where the path was resolved from.
    pub source: ConfigSource,
}

/// Resolve configuration from an optional CLI path and the environment.
pub fn resolve_config(cli_train_data: Option<PathBuf>) -> Config {
    if let Some(path) = cli_train_data {
        return Config {
            train_data: path,
            source: ConfigSource::CliArgument,
        };
    }
    if let Some(path) = std::env::var_os(ENV_TRAIN_DATA) {
        return Config {
            train_data: PathBuf::from(path),
            source: ConfigSource::Environment,
        };
    }
    Config {
        train_data: PathBuf::from(DEFAULT_TRAIN_DATA),
        source: ConfigSource::BuiltinDefault,
    }
}
