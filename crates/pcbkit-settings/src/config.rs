//! Application configuration for PCBKit
//!
//! Configuration is organized into sections:
//! - Tool preferences (restriction mode, angle step, dimension labels)
//! - Export defaults (output directory, pool cache)
//! - Logging (level, JSON output)
//!
//! Files are JSON or TOML, selected by extension. Missing sections and
//! fields fall back to their defaults.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use pcbkit_core::MeasurementSystem;
use pcbkit_designer::{RestrictMode, RestrictSettings, ToolSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the configuration inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Accepted values of [`LoggingSettings::level`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Interactive tool preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPreferences {
    /// Restriction mode a tool starts in
    pub restrict_mode: RestrictMode,
    /// Angle snap step in degrees
    pub angle_step_deg: f64,
    /// Dimension label text size in nm
    pub dimension_label_size: u64,
    /// Units used for dimension labels and tips
    pub measurement_system: MeasurementSystem,
}

impl Default for ToolPreferences {
    fn default() -> Self {
        let tools = ToolSettings::default();
        Self {
            restrict_mode: tools.restrict.default_mode,
            angle_step_deg: tools.restrict.angle_step_deg,
            dimension_label_size: tools.dimension_label_size,
            measurement_system: tools.measurement_system,
        }
    }
}

impl ToolPreferences {
    /// Settings handed to the tool manager.
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            restrict: RestrictSettings {
                default_mode: self.restrict_mode,
                angle_step_deg: self.angle_step_deg,
            },
            dimension_label_size: self.dimension_label_size,
            measurement_system: self.measurement_system,
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    /// Directory relative output paths are resolved against; the board's
    /// own directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    /// Cache directory handed to pools; the platform cache when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_cache_directory: Option<PathBuf>,
}

impl ExportPreferences {
    pub fn pool_cache_directory(&self) -> PathBuf {
        self.pool_cache_directory.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("pcbkit")
        })
    }
}

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter level when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of the pretty format
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolPreferences,
    pub export: ExportPreferences,
    pub logging: LoggingSettings,
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform location of the configuration file.
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("pcbkit").join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("cannot write {}: {}", path.display(), e))
        })?;
        debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let step = self.tools.angle_step_deg;
        if step.is_nan() || step <= 0.0 || step > 180.0 {
            return Err(ConfigError::out_of_range("tools.angle_step_deg", step));
        }
        if self.tools.dimension_label_size == 0 {
            return Err(ConfigError::out_of_range("tools.dimension_label_size", 0));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::UnknownValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }
        Ok(())
    }
}
