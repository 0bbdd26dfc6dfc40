use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::APP_NAME;
use crate::transform::TransformTarget;

const CONFIG_FILE: &str = "config.yaml";

/// User settings, read from `<config dir>/importman/config.yaml`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log file written by the CLI
    pub log_file: PathBuf,
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
    /// Prefix folder paths with the source file name in batch imports
    pub prefix_source_name: bool,
    /// Fields touched by find/replace when no target is given
    pub default_targets: Vec<TransformTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_file: PathBuf::from(format!("{}.log", APP_NAME)),
            log_level: String::from("info"),
            prefix_source_name: true,
            default_targets: TransformTarget::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Default location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Loads an explicit file, or the default one when `path` is `None`
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Writes the config as YAML, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}
