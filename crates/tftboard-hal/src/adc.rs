//! Analog front end
//!
//! The one-shot ADC driver lives outside this crate. All the power core needs
//! from it is a raw integer sample or a failure.

use crate::DeviceError;
use serde::{Deserialize, Serialize};

/// One-shot sampling service for the battery sense channel
pub trait AdcSampler {
    /// Take a single raw sample
    fn read(&mut self) -> Result<u16, DeviceError>;
}

impl<S: AdcSampler + ?Sized> AdcSampler for Box<S> {
    fn read(&mut self) -> Result<u16, DeviceError> {
        (**self).read()
    }
}

/// Input attenuation of the ADC channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attenuation {
    Db0,
    Db2_5,
    Db6,
    #[default]
    Db12,
}

impl Attenuation {
    /// Human readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            Attenuation::Db0 => "0 dB",
            Attenuation::Db2_5 => "2.5 dB",
            Attenuation::Db6 => "6 dB",
            Attenuation::Db12 => "12 dB",
        }
    }
}

/// Sample bit width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcResolution {
    bits: u8,
}

impl AdcResolution {
    pub const BITS_12: Self = Self { bits: 12 };

    /// Bit widths supported by the SAR ADC
    pub fn new(bits: u8) -> Result<Self, DeviceError> {
        if !(9..=13).contains(&bits) {
            return Err(DeviceError::InitializationFailed(format!(
                "Unsupported ADC bit width: {}",
                bits
            )));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Largest raw value the channel can report
    pub fn full_scale(&self) -> u16 {
        ((1u32 << self.bits) - 1) as u16
    }
}

impl Default for AdcResolution {
    fn default() -> Self {
        Self::BITS_12
    }
}
