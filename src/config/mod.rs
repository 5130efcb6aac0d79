//! User configuration for pixhide.
//!
//! Stored in `~/.pixhide/config.toml`:
//!
//! ```toml
//! codec = "ssdb"
//!
//! [params.lsb]
//! bits = 2
//!
//! [params.ssdb]
//! password = "hunter2"
//! ```
//!
//! Values from `[params.<codec>]` override the codec's built-in defaults and
//! are in turn overridden by `--param` on the command line.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::stego::{CodecParams, ParamValue};

/// Errors that can occur when reading or writing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// The configuration file contents.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Config {
    /// Codec used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,

    /// Parameter values per codec short name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, BTreeMap<String, ParamValue>>,
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// Returns an empty config if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the configuration from `path`, or an empty one if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        // Passwords may live in here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Configured parameter values for `codec`.
    pub fn params_for(&self, codec: &str) -> CodecParams {
        let mut params = CodecParams::new();
        if let Some(values) = self.params.get(codec) {
            for (name, value) in values {
                params.set(name, value.clone());
            }
        }
        params
    }

    /// Store a parameter value for `codec`.
    pub fn set_param(&mut self, codec: &str, name: &str, value: impl Into<ParamValue>) {
        self.params
            .entry(codec.to_string())
            .or_default()
            .insert(name.to_string(), value.into());
    }
}

/// Get the pixhide config directory (`~/.pixhide`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".pixhide"))
        .ok_or(ConfigError::NoConfigDir)
}
