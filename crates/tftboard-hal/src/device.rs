//! Board detection and capability descriptors
//!
//! A board is described once, at composition time, by a [`BoardProfile`]. The
//! profile lists which peripherals are actually wired so the rest of the
//! system never has to probe for a missing display or backlight at runtime.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("ADC sample read failed: {0}")]
    SamplingFailed(String),

    #[error("Charging pin read failed: {0}")]
    PinReadFailed(String),

    #[error("Unsupported board: {0}")]
    UnsupportedBoard(String),

    #[error("Hardware initialization failed: {0}")]
    InitializationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Board profile containing hardware specifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardProfile {
    pub id: String,
    pub name: String,
    pub chip: String,
    pub display: DisplaySpec,
    #[serde(default)]
    pub capabilities: BoardCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySpec {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub offset_x: u32,
    #[serde(default)]
    pub offset_y: u32,
    #[serde(default = "default_bits_per_pixel")]
    pub bits_per_pixel: u8,
}

fn default_bits_per_pixel() -> u8 {
    16
}

/// Peripherals a board configuration actually has
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCapabilities {
    #[serde(default)]
    pub display: bool,
    #[serde(default)]
    pub backlight: bool,
    #[serde(default)]
    pub battery_adc: bool,
    #[serde(default)]
    pub charging_pin: bool,
    #[serde(default)]
    pub audio_codec: bool,
    #[serde(default)]
    pub rgb_led: bool,
}

impl BoardCapabilities {
    /// Whether the board can toggle power-save on any local peripheral
    pub fn supports_power_save(&self) -> bool {
        self.display || self.backlight
    }
}

/// Main board structure
#[derive(Debug, Clone)]
pub struct Board {
    profile: BoardProfile,
}

impl Board {
    /// Look up one of the built-in board profiles by id
    pub fn from_id(id: &str) -> Result<Self, DeviceError> {
        let profile = match id.to_lowercase().as_str() {
            "esp32s3-1.14tft" => Self::profile_tft(),
            "esp32s3-1.14tft-led" => Self::profile_tft_led(),
            other => return Err(DeviceError::UnsupportedBoard(other.to_string())),
        };
        tracing::info!("Matched board profile: {}", profile.name);
        Ok(Self { profile })
    }

    /// Create a board from a TOML profile file
    pub fn from_profile_file(path: &Path) -> Result<Self, DeviceError> {
        let contents = fs::read_to_string(path)?;
        let profile: BoardProfile = toml::from_str(&contents)
            .map_err(|e| DeviceError::InitializationFailed(e.to_string()))?;
        tracing::info!("Loaded board profile {} from {}", profile.id, path.display());
        Ok(Self { profile })
    }

    /// Get board profile
    pub fn profile(&self) -> &BoardProfile {
        &self.profile
    }

    pub fn capabilities(&self) -> BoardCapabilities {
        self.profile.capabilities
    }

    /// Ids of all built-in profiles
    pub fn known_ids() -> &'static [&'static str] {
        &["esp32s3-1.14tft", "esp32s3-1.14tft-led"]
    }

    /// ESP32-S3 1.14" TFT with ADC battery sensing and power save
    fn profile_tft() -> BoardProfile {
        BoardProfile {
            id: "esp32s3-1.14tft".into(),
            name: "ESP32-S3 1.14\" TFT".into(),
            chip: "ESP32-S3FH4R2".into(),
            display: DisplaySpec {
                width: 240,
                height: 135,
                offset_x: 40,
                offset_y: 52,
                bits_per_pixel: 16,
            },
            capabilities: BoardCapabilities {
                display: true,
                backlight: true,
                battery_adc: true,
                charging_pin: true,
                audio_codec: false,
                rgb_led: true,
            },
        }
    }

    /// Same silkscreen, earlier wiring: no battery sensing, static LED only
    fn profile_tft_led() -> BoardProfile {
        BoardProfile {
            id: "esp32s3-1.14tft-led".into(),
            name: "ESP32-S3 1.14\" TFT (LED variant)".into(),
            chip: "ESP32-S3FH4R2".into(),
            display: DisplaySpec {
                width: 240,
                height: 135,
                offset_x: 40,
                offset_y: 52,
                bits_per_pixel: 16,
            },
            capabilities: BoardCapabilities {
                display: true,
                backlight: true,
                battery_adc: false,
                charging_pin: false,
                audio_codec: false,
                rgb_led: false,
            },
        }
    }
}
