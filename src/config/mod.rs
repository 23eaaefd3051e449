// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for verso.
//!
//! Settings live in a TOML file (`verso.toml` by default). Every field
//! has a default, so an empty or missing file is a valid configuration.

pub mod watcher;

pub use watcher::{ConfigEvent, ConfigWatcher};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use crate::analysis::HttpMeterClient;
use crate::strophe::{Color, Palette, RhymeTag};

/// Default config file name
pub const DEFAULT_CONFIG_FILE: &str = "verso.toml";

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Load the file if it exists, otherwise defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse TOML configuration")?;
        config.palette.to_palette()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Analysis service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// URL the lines are POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AnalysisConfig {
    /// Build the HTTP client these settings describe
    pub fn client(&self) -> Result<HttpMeterClient> {
        HttpMeterClient::new(self.endpoint.clone(), self.timeout_secs)
            .context("Failed to build analysis client")
    }
}

/// Snapshot storage settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Directory holding `strophe-<n>.yaml` files
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
    /// Save after every edit
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("strophes")
}
fn default_autosave() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
            autosave: default_autosave(),
        }
    }
}

/// Color overrides, as `#rrggbb` strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaletteConfig {
    #[serde(default)]
    pub a: Option<String>,
    #[serde(default)]
    pub b: Option<String>,
    #[serde(default)]
    pub c: Option<String>,
    #[serde(default)]
    pub d: Option<String>,
    /// Fill for words that are not rhymed
    #[serde(default)]
    pub default_fill: Option<String>,
}

impl PaletteConfig {
    /// Apply the overrides on top of the built-in palette
    pub fn to_palette(&self) -> Result<Palette> {
        let mut palette = Palette::default();
        let overrides = [
            (RhymeTag::A, &self.a),
            (RhymeTag::B, &self.b),
            (RhymeTag::C, &self.c),
            (RhymeTag::D, &self.d),
        ];
        for (tag, value) in overrides {
            if let Some(hex) = value {
                let color: Color = hex
                    .parse()
                    .with_context(|| format!("Invalid color for tag {}", tag))?;
                palette = palette.with_tag_fill(tag, color);
            }
        }
        if let Some(hex) = &self.default_fill {
            let color: Color = hex.parse().context("Invalid default_fill color")?;
            palette = palette.with_default_fill(color);
        }
        Ok(palette)
    }
}

/// Terminal UI settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Redraw rate
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Seconds a status message stays on screen
    #[serde(default = "default_status_secs")]
    pub status_secs: u64,
}

fn default_frame_rate() -> u32 {
    30
}
fn default_status_secs() -> u64 {
    3
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            status_secs: default_status_secs(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Directory for the log file
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    /// Log file name
    #[serde(default = "default_log_file")]
    pub file: String,
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_log_file() -> String {
    "verso.log".to_string()
}
fn default_log_level() -> String {
    "verso=info,warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}
