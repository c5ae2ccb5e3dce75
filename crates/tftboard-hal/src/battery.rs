//! Battery percentage estimation
//!
//! Linear map between an empty and a full cell voltage. Li-ion discharge is
//! not linear in this band, so the result is only good enough for a status
//! bar icon.

use serde::{Deserialize, Serialize};

/// Cell voltage reported as 0 %
pub const DEFAULT_EMPTY_MV: u32 = 3000;

/// Cell voltage reported as 100 %
pub const DEFAULT_FULL_MV: u32 = 4200;

/// Divider on the sense line (100K/100K)
pub const DEFAULT_DIVIDER_RATIO: f32 = 2.0;

/// One battery measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Raw ADC sample
    pub raw: u16,
    /// Battery voltage after divider correction
    pub millivolts: u32,
    /// Estimated charge, 0-100
    pub percent: u8,
}

/// Maps sensed millivolts to a charge percentage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryEstimator {
    divider_ratio: f32,
    empty_mv: u32,
    full_mv: u32,
}

impl BatteryEstimator {
    /// Estimator with a board-specific divider and the default voltage band
    pub fn new(divider_ratio: f32) -> Self {
        Self {
            divider_ratio,
            empty_mv: DEFAULT_EMPTY_MV,
            full_mv: DEFAULT_FULL_MV,
        }
    }

    /// Override the empty/full reference band
    ///
    /// `full_mv` must be greater than `empty_mv`; the config layer rejects
    /// anything else before it gets here.
    pub fn with_band(mut self, empty_mv: u32, full_mv: u32) -> Self {
        debug_assert!(full_mv > empty_mv);
        self.empty_mv = empty_mv;
        self.full_mv = full_mv;
        self
    }

    pub fn divider_ratio(&self) -> f32 {
        self.divider_ratio
    }

    pub fn band(&self) -> (u32, u32) {
        (self.empty_mv, self.full_mv)
    }

    /// Correct a sensed voltage for the divider between cell and pin
    pub fn adjust(&self, sensed_mv: u32) -> u32 {
        (sensed_mv as f32 * self.divider_ratio) as u32
    }

    /// Percentage for an adjusted cell voltage, clamped to 0-100
    pub fn to_percent(&self, adjusted_mv: u32) -> u8 {
        if adjusted_mv <= self.empty_mv {
            return 0;
        }
        if adjusted_mv >= self.full_mv {
            return 100;
        }

        let span = u64::from(self.full_mv - self.empty_mv);
        (u64::from(adjusted_mv - self.empty_mv) * 100 / span) as u8
    }

    /// Build a full reading from a raw sample and its sensed voltage
    pub fn reading(&self, raw: u16, sensed_mv: u32) -> BatteryReading {
        let millivolts = self.adjust(sensed_mv);
        BatteryReading {
            raw,
            millivolts,
            percent: self.to_percent(millivolts),
        }
    }
}

impl Default for BatteryEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_DIVIDER_RATIO)
    }
}
