//! PCBKit Settings Crate
//!
//! Application configuration: tool preferences, export defaults and
//! logging, persisted as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    Config, ExportPreferences, LoggingSettings, ToolPreferences, CONFIG_FILE_NAME, LOG_LEVELS,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
