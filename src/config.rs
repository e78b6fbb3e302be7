//! Configuration file handling for glyphgrid.
//!
//! Loads configuration from `$XDG_CONFIG_HOME/glyphgrid/config.toml` or a
//! custom path. Every section is optional; command-line flags are applied on
//! top of whatever the file provides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::font::FontSpec;
use crate::layout::{Container, SizingMode};
use crate::pipeline::RenderConfig;

/// Configuration file structure for glyphgrid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub font: FontSpec,
    pub layout: LayoutConfig,
    pub animation: AnimationConfig,
    /// Extra named palettes, consulted before the built-ins.
    pub palettes: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Container width in pixels; unset means sized to content.
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub mode: SizingMode,
}

impl LayoutConfig {
    pub fn container(&self) -> Container {
        Container {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnimationConfig {
    /// Re-seed the noise dither on this period. Unset or zero disables it.
    #[serde(alias = "static_interval_ms")]
    pub static_interval_ms: Option<u64>,
}

impl AnimationConfig {
    pub fn static_interval(&self) -> Option<Duration> {
        self.static_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// Returns the default config if the file doesn't exist, and an error if
    /// it exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("glyphgrid")
        .join("config.toml")
}
