//! Runtime configuration resolved from the command line and environment.
//!
//! Priority (highest first): CLI flags, environment variables (via clap `env`),
//! compiled defaults. The data directory is created if it does not exist.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cli::Cli;

/// Default data directory name under the home directory.
pub const DEFAULT_DIR_NAME: &str = ".taskflow";
/// Log file name inside the data directory.
pub const LOG_FILE_NAME: &str = "taskflow.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory; pass --data-dir or set TASKFLOW_DIR")]
    NoHomeDir,

    #[error("failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(DEFAULT_DIR_NAME),
        };
        Self::new(data_dir, &cli.log_level)
    }

    /// Build a config for `data_dir`, creating the directory.
    pub fn new(data_dir: PathBuf, log_level: &str) -> Result<Self, ConfigError> {
        std::fs::create_dir_all(&data_dir).map_err(|source| ConfigError::CreateDir {
            path: data_dir.clone(),
            source,
        })?;
        Ok(AppConfig {
            data_dir,
            log_level: log_level.to_string(),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.data_dir
    }
}
