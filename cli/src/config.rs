//! Configuration management for the tonebox CLI.
//!
//! Configuration is stored in ~/.tonebox/config.yaml. Every field is
//! optional; command-line flags take precedence over the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tonebox_audio::Waveform;
use tonebox_player::Articulation;

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".tonebox";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Which tone backend plays the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// PC speaker through the input-event device.
    #[default]
    Beeper,
    /// Waveform synthesizer on the default sound card.
    Synth,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Beeper => "beeper",
            Self::Synth => "synth",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beeper" => Ok(Self::Beeper),
            "synth" => Ok(Self::Synth),
            other => Err(format!("unknown backend '{}' (expected beeper or synth)", other)),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waveform: Option<Waveform>,

    /// Beeper device path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub articulation: Option<Articulation>,

    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR))
    }

    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the file this config was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Loads configuration from `custom_path` or the default location.
///
/// A missing file yields the default configuration. A file that exists but
/// cannot be read or parsed is an error.
pub fn load_config(custom_path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => p.to_path_buf(),
        None => match Config::default_config_path() {
            Some(p) => p,
            None => {
                tracing::debug!("no home directory, using default config");
                return Ok(Config::default());
            }
        },
    };

    if !config_path.exists() {
        tracing::debug!("config {} not found, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read config {}", config_path.display()))?;
    let mut cfg: Config = if content.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config {}", config_path.display()))?
    };
    cfg.config_path = Some(config_path);
    Ok(cfg)
}
