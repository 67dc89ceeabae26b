//! Configuration file support for episode-browser.
//!
//! This module provides functionality for loading and saving user preferences
//! from a TOML configuration file.

use crate::api::DEFAULT_API_URL;
use crate::error::{AppError, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

/// Image reference used on cards for episodes without an image.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "placeholder.jpg";

/// User configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the TVMaze-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Image reference shown when an episode has none
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,

    /// File to write logs to while the TUI owns the terminal
    #[serde(default)]
    pub log_file: Option<String>,

    /// UI colors
    #[serde(default)]
    pub colors: ColorScheme,
}

/// Color names for the TUI, parsed with ratatui's color syntax
/// (`"yellow"`, `"light-blue"`, `"#ff8800"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// Background of highlighted search matches
    #[serde(default = "default_highlight")]
    pub highlight: String,

    /// Borders of focused controls and card titles
    #[serde(default = "default_accent")]
    pub accent: String,

    /// Status line text
    #[serde(default = "default_status")]
    pub status: String,

    /// Status line text when a load failed
    #[serde(default = "default_error")]
    pub error: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            highlight: default_highlight(),
            accent: default_accent(),
            status: default_status(),
            error: default_error(),
        }
    }
}

impl ColorScheme {
    /// Resolve a configured color name, falling back when it does not parse.
    pub fn resolve(name: &str, fallback: Color) -> Color {
        Color::from_str(name).unwrap_or(fallback)
    }

    pub fn highlight_color(&self) -> Color {
        Self::resolve(&self.highlight, Color::Yellow)
    }

    pub fn accent_color(&self) -> Color {
        Self::resolve(&self.accent, Color::Cyan)
    }

    pub fn status_color(&self) -> Color {
        Self::resolve(&self.status, Color::Green)
    }

    pub fn error_color(&self) -> Color {
        Self::resolve(&self.error, Color::Red)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_placeholder_image() -> String {
    DEFAULT_PLACEHOLDER_IMAGE.to_string()
}

fn default_highlight() -> String {
    "yellow".to_string()
}

fn default_accent() -> String {
    "cyan".to_string()
}

fn default_status() -> String {
    "green".to_string()
}

fn default_error() -> String {
    "red".to_string()
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            api_url: default_api_url(),
            placeholder_image: default_placeholder_image(),
            log_file: None,
            colors: ColorScheme::default(),
        }
    }

    /// Get the path to the config file.
    ///
    /// Returns ~/.config/episode-browser/config.toml on Linux,
    /// or a platform-appropriate location on other systems.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
            })?
            .join("episode-browser");

        Ok(config_dir.join("config.toml"))
    }

    /// Log file used when neither the CLI nor the config names one.
    ///
    /// Returns ~/.cache/episode-browser/episode-browser.log on Linux.
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("episode-browser").join("episode-browser.log"))
    }

    /// Where logs go: the CLI flag, then `log_file`, then the default.
    pub fn log_path(&self, cli: Option<&str>) -> Option<PathBuf> {
        cli.map(PathBuf::from)
            .or_else(|| self.log_file.as_deref().map(PathBuf::from))
            .or_else(Self::default_log_path)
    }

    /// Load config from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse config from TOML text; missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.api_url.trim().is_empty() {
            return Err(AppError::Config("api_url must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Save config to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Create a default config file if one doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn create_default_if_missing() -> Result<PathBuf> {
        let path = Self::get_config_path()?;

        if !path.exists() {
            Self::new().save()?;
        }

        Ok(path)
    }
}
