//! Configuration management for tftboard
//!
//! Handles the board configuration: which board profile to use, battery
//! sensing parameters, ADC channel setup and backlight levels. The system
//! file is read first and the user file is layered over it.

mod sections;

pub use sections::{AdcSection, BacklightSection, PowerSection};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/tftboard";
pub const USER_CONFIG_DIR: &str = "/data/.tftboard";

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "TFTBOARD_CONFIG";

fn default_board() -> String {
    "esp32s3-1.14tft".to_string()
}

/// Main board configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Built-in board profile id
    #[serde(default = "default_board")]
    pub board: String,

    /// Optional TOML board profile overriding `board`
    #[serde(default)]
    pub profile_path: Option<PathBuf>,

    #[serde(default)]
    pub power: PowerSection,

    #[serde(default)]
    pub adc: AdcSection,

    #[serde(default)]
    pub backlight: BacklightSection,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board: default_board(),
            profile_path: None,
            power: PowerSection::default(),
            adc: AdcSection::default(),
            backlight: BacklightSection::default(),
        }
    }
}

impl BoardConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// `TFTBOARD_CONFIG` wins outright. Otherwise the user file is merged
    /// over the system file; with neither present the defaults are used.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        let system_config = Path::new(CONFIG_DIR).join("config.toml");
        let user_config = Path::new(USER_CONFIG_DIR).join("config.toml");
        Self::load_layered(&system_config, &user_config)
    }

    /// Merge `overlay` over `base`, either of which may be missing
    pub fn load_layered(base: &Path, overlay: &Path) -> Result<Self, ConfigError> {
        let mut merged: Option<toml::Value> = None;

        for path in [base, overlay] {
            if !path.exists() {
                continue;
            }
            let value: toml::Value = toml::from_str(&std::fs::read_to_string(path)?)?;
            tracing::debug!("Read configuration layer {}", path.display());
            match merged.as_mut() {
                Some(base_value) => merge_toml(base_value, value),
                None => merged = Some(value),
            }
        }

        let config = match merged {
            Some(value) => value
                .try_into::<Self>()
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
            None => {
                tracing::warn!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the power core cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let power = &self.power;

        if power.full_mv <= power.empty_mv {
            return Err(ConfigError::Invalid(format!(
                "full_mv ({}) must be greater than empty_mv ({})",
                power.full_mv, power.empty_mv
            )));
        }
        if !(power.divider_ratio.is_finite() && power.divider_ratio > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "divider_ratio must be positive, got {}",
                power.divider_ratio
            )));
        }
        if power.low_battery_threshold > 100 || power.critical_battery_threshold > 100 {
            return Err(ConfigError::Invalid(
                "battery thresholds must be within 0-100".into(),
            ));
        }
        if power.debounce_reads == 0 {
            return Err(ConfigError::Invalid("debounce_reads must be at least 1".into()));
        }
        if power.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "update_interval_ms must be at least 1".into(),
            ));
        }
        if self.backlight.default_brightness > 100 || self.backlight.power_save_brightness > 100 {
            return Err(ConfigError::Invalid(
                "backlight levels must be within 0-100".into(),
            ));
        }
        self.adc
            .resolution()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(())
    }
}

/// Helper function to merge TOML values
pub fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(&key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key, value);
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
