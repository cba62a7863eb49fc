//! Application configuration for Pulse
//!
//! All deployment-specific values (spreadsheet IDs, API tokens, endpoints)
//! are injected through this module. Nothing here may be hardcoded at call
//! sites.

use crate::error::{PulseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the Google Sheets values client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier to read from
    pub spreadsheet_id: String,
    /// Bearer token used for the values API
    pub api_token: String,
    /// Base URL of the sheets values API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl SheetsConfig {
    /// Create a new configuration with the minimum required parameters
    pub fn new(spreadsheet_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_token: api_token.into(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Logging settings as they appear in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load configuration from a TOML file with `PULSE_*` environment
    /// variable overrides (e.g. `PULSE_SHEETS__API_TOKEN`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            );

        let loaded: AppConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(PulseError::validation_field(
                "Spreadsheet ID must not be empty",
                "sheets.spreadsheet_id",
            ));
        }
        if self.sheets.api_token.trim().is_empty() {
            return Err(PulseError::validation_field(
                "API token must not be empty",
                "sheets.api_token",
            ));
        }
        if self.sheets.timeout_secs == 0 {
            return Err(PulseError::validation_field(
                "Timeout must be greater than 0",
                "sheets.timeout_secs",
            ));
        }
        Ok(())
    }
}
