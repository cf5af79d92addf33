//! Configuration module for the ETL designer
//!
//! This module handles persistent designer settings:
//! - Canvas behaviour (zoom limits, placement search, node sizes)
//! - Backend service endpoints
//!
//! # Settings Location
//!
//! Settings are stored in the platform-appropriate config directory:
//! - **Linux**: `~/.config/dev.etl-designer/settings.toml`
//! - **macOS**: `~/Library/Application Support/dev.etl-designer/settings.toml`
//! - **Windows**: `%APPDATA%\dev.etl-designer\settings.toml`
//!
//! # Example
//!
//! ```ignore
//! use etl_designer::config::DesignerSettings;
//!
//! let mut settings = DesignerSettings::load_or_default();
//! settings.canvas.max_scale = 3.0;
//! settings.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{DesignerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.etl-designer";

/// Settings filename
pub const SETTINGS_FILE: &str = "settings.toml";

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the settings file
pub fn settings_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(SETTINGS_FILE))
}

/// Persistent designer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignerSettings {
    /// Canvas interaction settings
    #[serde(default)]
    pub canvas: CanvasSettings,

    /// Backend service settings
    #[serde(default)]
    pub services: ServiceSettings,
}

impl DesignerSettings {
    /// Load settings from the default location
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = settings_path().ok_or_else(|| {
            DesignerError::Config("Could not determine settings path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DesignerError::Config(format!("Failed to read settings {:?}: {}", path, e))
        })?;

        let mut settings: Self = toml::from_str(&content).map_err(|e| {
            DesignerError::Config(format!("Failed to parse settings {:?}: {}", path, e))
        })?;

        if settings.canvas.sanitize() {
            tracing::warn!("Adjusted out-of-range canvas settings from {:?}", path);
        }

        Ok(settings)
    }

    /// Load settings, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        let path = settings_path().ok_or_else(|| {
            DesignerError::Config("Could not determine settings path".to_string())
        })?;
        self.save_to(path)
    }

    /// Save settings to an explicit file, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DesignerError::Config(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DesignerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            DesignerError::Config(format!("Failed to write settings {:?}: {}", path, e))
        })
    }
}
