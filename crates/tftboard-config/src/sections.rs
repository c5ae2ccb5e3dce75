//! Per-peripheral configuration sections

use serde::{Deserialize, Serialize};
use tftboard_hal::battery::{DEFAULT_DIVIDER_RATIO, DEFAULT_EMPTY_MV, DEFAULT_FULL_MV};
use tftboard_hal::display::DEFAULT_BRIGHTNESS;
use tftboard_hal::power_save::DEFAULT_POWER_SAVE_BRIGHTNESS;
use tftboard_hal::{ActiveLevel, AdcResolution, Attenuation, DeviceError, PowerConfig};

/// Battery sensing and charge detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSection {
    /// GPIO of the charger status line, absent when not wired
    #[serde(default)]
    pub charging_pin: Option<u8>,
    /// Level meaning "charging"
    #[serde(default)]
    pub charging_active_level: ActiveLevel,
    /// Battery-to-pin voltage divider ratio
    #[serde(default = "default_divider_ratio")]
    pub divider_ratio: f32,
    /// Cell voltage shown as 0 %
    #[serde(default = "default_empty_mv")]
    pub empty_mv: u32,
    /// Cell voltage shown as 100 %
    #[serde(default = "default_full_mv")]
    pub full_mv: u32,
    #[serde(default = "default_low_threshold")]
    pub low_battery_threshold: u8,
    #[serde(default = "default_critical_threshold")]
    pub critical_battery_threshold: u8,
    /// Consecutive matching pin reads before the charge state flips
    #[serde(default = "default_debounce_reads")]
    pub debounce_reads: u8,
    /// Period of the update tick
    #[serde(default = "default_update_interval")]
    pub update_interval_ms: u64,
}

fn default_divider_ratio() -> f32 {
    DEFAULT_DIVIDER_RATIO
}

fn default_empty_mv() -> u32 {
    DEFAULT_EMPTY_MV
}

fn default_full_mv() -> u32 {
    DEFAULT_FULL_MV
}

fn default_low_threshold() -> u8 {
    20
}

fn default_critical_threshold() -> u8 {
    5
}

fn default_debounce_reads() -> u8 {
    1
}

fn default_update_interval() -> u64 {
    1000
}

impl Default for PowerSection {
    fn default() -> Self {
        Self {
            charging_pin: None,
            charging_active_level: ActiveLevel::default(),
            divider_ratio: default_divider_ratio(),
            empty_mv: default_empty_mv(),
            full_mv: default_full_mv(),
            low_battery_threshold: default_low_threshold(),
            critical_battery_threshold: default_critical_threshold(),
            debounce_reads: default_debounce_reads(),
            update_interval_ms: default_update_interval(),
        }
    }
}

impl PowerSection {
    /// Settings consumed by [`tftboard_hal::PowerManager`]
    pub fn power_config(&self) -> PowerConfig {
        PowerConfig {
            divider_ratio: self.divider_ratio,
            empty_mv: self.empty_mv,
            full_mv: self.full_mv,
            charging_active_level: self.charging_active_level,
            debounce_reads: self.debounce_reads,
            low_battery_threshold: self.low_battery_threshold,
            critical_battery_threshold: self.critical_battery_threshold,
        }
    }
}

/// Battery sense ADC channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdcSection {
    #[serde(default)]
    pub attenuation: Attenuation,
    #[serde(default = "default_bit_width")]
    pub bit_width: u8,
    /// ADC1 channel of the sense line
    #[serde(default = "default_channel")]
    pub channel: u8,
}

fn default_bit_width() -> u8 {
    12
}

fn default_channel() -> u8 {
    3
}

impl Default for AdcSection {
    fn default() -> Self {
        Self {
            attenuation: Attenuation::default(),
            bit_width: default_bit_width(),
            channel: default_channel(),
        }
    }
}

impl AdcSection {
    pub fn resolution(&self) -> Result<AdcResolution, DeviceError> {
        AdcResolution::new(self.bit_width)
    }
}

/// Backlight levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacklightSection {
    /// Brightness applied at bring-up and restored after power save
    #[serde(default = "default_brightness")]
    pub default_brightness: u8,
    /// Brightness while power save is on
    #[serde(default = "default_power_save_brightness")]
    pub power_save_brightness: u8,
    #[serde(default)]
    pub output_invert: bool,
}

fn default_brightness() -> u8 {
    DEFAULT_BRIGHTNESS
}

fn default_power_save_brightness() -> u8 {
    DEFAULT_POWER_SAVE_BRIGHTNESS
}

impl Default for BacklightSection {
    fn default() -> Self {
        Self {
            default_brightness: default_brightness(),
            power_save_brightness: default_power_save_brightness(),
            output_invert: false,
        }
    }
}
