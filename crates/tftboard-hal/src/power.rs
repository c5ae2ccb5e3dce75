//! Power management
//!
//! Battery voltage sensing, percentage estimation and charge detection behind
//! a single periodic `update()` tick. The caller owns the cadence; nothing in
//! here sleeps, retries or spawns.

use crate::DeviceError;
use crate::adc::AdcSampler;
use crate::battery::{
    BatteryEstimator, BatteryReading, DEFAULT_DIVIDER_RATIO, DEFAULT_EMPTY_MV, DEFAULT_FULL_MV,
};
use crate::calibration::{CalibrationProfile, Calibrator};
use crate::charge::{ActiveLevel, ChargeCallback, ChargeDetector, ChargeStatus, ChargingPin};
use std::sync::{Arc, Mutex};

/// Voltage reported before the first successful sample
pub const NO_READING: u32 = 0;

/// Level reported before the first successful sample
pub const NO_LEVEL: u8 = 0;

/// Power manager configuration
#[derive(Debug, Clone)]
pub struct PowerConfig {
    pub divider_ratio: f32,
    pub empty_mv: u32,
    pub full_mv: u32,
    pub charging_active_level: ActiveLevel,
    pub debounce_reads: u8,
    pub low_battery_threshold: u8,
    pub critical_battery_threshold: u8,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            divider_ratio: DEFAULT_DIVIDER_RATIO,
            empty_mv: DEFAULT_EMPTY_MV,
            full_mv: DEFAULT_FULL_MV,
            charging_active_level: ActiveLevel::High,
            debounce_reads: 1,
            low_battery_threshold: 20,
            critical_battery_threshold: 5,
        }
    }
}

/// Point-in-time copy of everything the power manager knows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerStatus {
    pub reading: Option<BatteryReading>,
    pub charge: ChargeStatus,
    pub low: bool,
    pub critical: bool,
}

/// Power manager shared between the update tick and other contexts
pub type SharedPowerManager = Arc<Mutex<PowerManager>>;

/// Power manager
pub struct PowerManager {
    config: PowerConfig,
    sampler: Box<dyn AdcSampler + Send>,
    calibrator: Calibrator,
    estimator: BatteryEstimator,
    detector: ChargeDetector,
    reading: Option<BatteryReading>,
}

impl PowerManager {
    /// Create a power manager; pass [`ChargingPin::Absent`] when no pin is wired
    pub fn new(
        sampler: Box<dyn AdcSampler + Send>,
        calibration: CalibrationProfile,
        charging_pin: ChargingPin,
        config: PowerConfig,
    ) -> Self {
        let estimator =
            BatteryEstimator::new(config.divider_ratio).with_band(config.empty_mv, config.full_mv);
        let detector = ChargeDetector::new(charging_pin, config.charging_active_level)
            .with_debounce(config.debounce_reads);

        let calibrator = Calibrator::new(calibration);
        tracing::info!(
            "Power manager ready (calibrated: {}, divider: {})",
            calibrator.profile().is_valid(),
            config.divider_ratio
        );

        Self {
            sampler,
            calibrator,
            estimator,
            detector,
            reading: None,
            config,
        }
    }

    /// Run one sample/estimate cycle followed by charge detection
    pub fn update(&mut self) {
        match self.sample() {
            Ok(reading) => {
                tracing::debug!(
                    "Battery raw={} voltage={}mV level={}%",
                    reading.raw,
                    reading.millivolts,
                    reading.percent
                );
                self.reading = Some(reading);
            }
            Err(e) => {
                tracing::warn!("Battery sample skipped: {}", e);
            }
        }

        self.detector.update();
    }

    fn sample(&mut self) -> Result<BatteryReading, DeviceError> {
        let raw = self.sampler.read()?;
        let sensed_mv = self.calibrator.to_millivolts(raw);
        Ok(self.estimator.reading(raw, sensed_mv))
    }

    /// Battery voltage in mV after divider correction, [`NO_READING`] if never sampled
    pub fn battery_voltage(&self) -> u32 {
        self.reading.map(|r| r.millivolts).unwrap_or(NO_READING)
    }

    /// Battery level 0-100, [`NO_LEVEL`] if never sampled
    pub fn battery_level(&self) -> u8 {
        self.reading.map(|r| r.percent).unwrap_or(NO_LEVEL)
    }

    /// Most recent successful reading
    pub fn reading(&self) -> Option<BatteryReading> {
        self.reading
    }

    pub fn is_charging(&self) -> bool {
        self.detector.is_charging()
    }

    pub fn is_discharging(&self) -> bool {
        self.detector.is_discharging()
    }

    pub fn charge_status(&self) -> ChargeStatus {
        self.detector.status()
    }

    /// Register the charging transition callback (last registration wins)
    ///
    /// The callback runs synchronously inside [`update`](Self::update) and
    /// must return quickly.
    pub fn on_charging_status_changed<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        let callback: ChargeCallback = Box::new(callback);
        self.detector.set_callback(callback);
    }

    /// Check if battery is low (at or below threshold, not charging)
    pub fn is_battery_low(&self) -> bool {
        self.at_or_below(self.config.low_battery_threshold)
    }

    /// Check if battery is critical (at or below threshold, not charging)
    pub fn is_battery_critical(&self) -> bool {
        self.at_or_below(self.config.critical_battery_threshold)
    }

    fn at_or_below(&self, threshold: u8) -> bool {
        match self.reading {
            Some(reading) => reading.percent <= threshold && !self.is_charging(),
            None => false,
        }
    }

    pub fn status(&self) -> PowerStatus {
        PowerStatus {
            reading: self.reading,
            charge: self.charge_status(),
            low: self.is_battery_low(),
            critical: self.is_battery_critical(),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Set low battery threshold
    pub fn set_low_battery_threshold(&mut self, threshold: u8) {
        self.config.low_battery_threshold = threshold.min(100);
    }

    pub fn into_shared(self) -> SharedPowerManager {
        Arc::new(Mutex::new(self))
    }
}
