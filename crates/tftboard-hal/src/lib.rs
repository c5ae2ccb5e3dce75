//! Hardware Abstraction Layer (HAL)
//!
//! Power management core for the ESP32-S3 1.14" TFT board: battery voltage
//! sensing, charge detection, percentage estimation and power-save
//! coordination across the display and backlight.
//!
//! Peripheral bring-up (SPI, I2C, GPIO, the ADC unit itself) happens outside
//! this crate. The power core reaches the hardware only through the small
//! traits in [`adc`], [`calibration`], [`charge`] and [`display`].
//!
//! # Example
//!
//! ```no_run
//! use tftboard_hal::mock::MockHal;
//! use tftboard_hal::{AdcResolution, Attenuation, CalibrationProfile, PowerConfig, PowerManager};
//!
//! fn main() -> anyhow::Result<()> {
//!     let hal = MockHal::new("esp32s3-1.14tft")?;
//!     let sampler = hal.sampler().expect("board has battery sensing");
//!     let calibration = CalibrationProfile::uncalibrated(Attenuation::Db12, AdcResolution::BITS_12);
//!
//!     let mut power = PowerManager::new(sampler, calibration, hal.charging_pin(), PowerConfig::default());
//!     power.on_charging_status_changed(|charging| println!("charging: {charging}"));
//!     power.update();
//!     println!("Battery: {}% ({} mV)", power.battery_level(), power.battery_voltage());
//!     Ok(())
//! }
//! ```

pub mod adc;
pub mod battery;
pub mod calibration;
pub mod charge;
pub mod device;
pub mod display;
pub mod mock;
pub mod power;
pub mod power_save;

pub use adc::{AdcResolution, AdcSampler, Attenuation};
pub use battery::{BatteryEstimator, BatteryReading};
pub use calibration::{CalibrationCurve, CalibrationProfile, Calibrator};
pub use charge::{ActiveLevel, ChargeDetector, ChargePin, ChargeStatus, ChargingPin};
pub use device::{Board, BoardCapabilities, BoardProfile, DeviceError, DisplaySpec};
pub use display::{Backlight, PanelDisplay, PwmBacklight, PwmOutput};
pub use power::{
    NO_LEVEL, NO_READING, PowerConfig, PowerManager, PowerStatus, SharedPowerManager,
};
pub use power_save::PowerSaveCoordinator;

/// HAL Result type
pub type Result<T> = std::result::Result<T, DeviceError>;
