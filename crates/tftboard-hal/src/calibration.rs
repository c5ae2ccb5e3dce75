//! Raw sample to millivolt conversion
//!
//! When the chip carries eFuse calibration data the vendor curve-fitting
//! service gives an accurate reading. When it does not, a fixed linear
//! transform against a 3.3 V reference is used instead.

use crate::adc::{AdcResolution, Attenuation};

/// Reference voltage of the linear fallback
pub const FALLBACK_REFERENCE_MV: u32 = 3300;

/// Full scale of the linear fallback (12 bit nominal)
pub const FALLBACK_FULL_SCALE: u32 = 4095;

/// Opaque curve-fitting calibration handle
///
/// Dropping the handle releases the underlying calibration scheme.
pub trait CalibrationCurve {
    /// Convert a raw sample, `None` if the scheme rejects it
    fn raw_to_millivolts(&self, raw: u16) -> Option<u32>;
}

/// Calibration settings of the battery sense channel
pub struct CalibrationProfile {
    attenuation: Attenuation,
    resolution: AdcResolution,
    curve: Option<Box<dyn CalibrationCurve + Send>>,
}

impl CalibrationProfile {
    /// Build a profile; `curve` is `None` when scheme creation failed
    pub fn new(
        attenuation: Attenuation,
        resolution: AdcResolution,
        curve: Option<Box<dyn CalibrationCurve + Send>>,
    ) -> Self {
        if curve.is_some() {
            tracing::info!(
                "ADC calibration enabled ({} attenuation, {} bit)",
                attenuation.as_str(),
                resolution.bits()
            );
        } else {
            tracing::warn!(
                "ADC calibration unavailable, using linear {} mV / {} fallback",
                FALLBACK_REFERENCE_MV,
                FALLBACK_FULL_SCALE
            );
        }

        Self {
            attenuation,
            resolution,
            curve,
        }
    }

    /// Profile without a calibration curve
    pub fn uncalibrated(attenuation: Attenuation, resolution: AdcResolution) -> Self {
        Self::new(attenuation, resolution, None)
    }

    /// Whether curve-fitting calibration succeeded at construction
    pub fn is_valid(&self) -> bool {
        self.curve.is_some()
    }

    pub fn attenuation(&self) -> Attenuation {
        self.attenuation
    }

    pub fn resolution(&self) -> AdcResolution {
        self.resolution
    }
}

impl std::fmt::Debug for CalibrationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalibrationProfile")
            .field("attenuation", &self.attenuation)
            .field("resolution", &self.resolution)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Converts raw samples to sensed millivolts
#[derive(Debug)]
pub struct Calibrator {
    profile: CalibrationProfile,
}

impl Calibrator {
    pub fn new(profile: CalibrationProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Convert a raw sample to millivolts at the sense pin
    pub fn to_millivolts(&self, raw: u16) -> u32 {
        match &self.profile.curve {
            Some(curve) => match curve.raw_to_millivolts(raw) {
                Some(mv) => mv,
                None => {
                    tracing::debug!("Calibration rejected raw {}, using linear fallback", raw);
                    linear_millivolts(raw)
                }
            },
            None => linear_millivolts(raw),
        }
    }
}

/// `raw * 3300 / 4095`, integer division
pub fn linear_millivolts(raw: u16) -> u32 {
    raw as u32 * FALLBACK_REFERENCE_MV / FALLBACK_FULL_SCALE
}
