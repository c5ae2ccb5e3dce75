//! Charging status detection
//!
//! The charger IC drives a status line that is sampled once per update. The
//! first confirmed level sets the starting state. After that the stored state
//! only changes when the sampled level disagrees with it, and the transition
//! callback runs on exactly those changes.

use crate::DeviceError;
use serde::{Deserialize, Serialize};

/// Tri-state charging status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeStatus {
    /// No successful pin read yet, or no pin wired
    #[default]
    Unknown,
    Charging,
    Discharging,
}

impl ChargeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeStatus::Unknown => "unknown",
            ChargeStatus::Charging => "charging",
            ChargeStatus::Discharging => "discharging",
        }
    }
}

/// Digital input connected to the charger status output
pub trait ChargePin {
    fn is_high(&mut self) -> Result<bool, DeviceError>;
}

/// Pin level that means "actively charging"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveLevel {
    #[default]
    High,
    Low,
}

impl ActiveLevel {
    fn status_for(&self, is_high: bool) -> ChargeStatus {
        let charging = match self {
            ActiveLevel::High => is_high,
            ActiveLevel::Low => !is_high,
        };
        if charging {
            ChargeStatus::Charging
        } else {
            ChargeStatus::Discharging
        }
    }
}

/// Charging pin, or the "not present" sentinel
pub enum ChargingPin {
    Absent,
    Present(Box<dyn ChargePin + Send>),
}

impl ChargingPin {
    pub fn is_present(&self) -> bool {
        matches!(self, ChargingPin::Present(_))
    }
}

impl std::fmt::Debug for ChargingPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargingPin::Absent => f.write_str("Absent"),
            ChargingPin::Present(_) => f.write_str("Present"),
        }
    }
}

/// Transition callback, receives `true` when charging starts
pub type ChargeCallback = Box<dyn FnMut(bool) + Send>;

/// Edge-triggered charge state machine
pub struct ChargeDetector {
    pin: ChargingPin,
    active_level: ActiveLevel,
    debounce_reads: u8,
    status: ChargeStatus,
    pending: Option<(ChargeStatus, u8)>,
    callback: Option<ChargeCallback>,
}

impl ChargeDetector {
    /// Detector that flips on the first differing read
    pub fn new(pin: ChargingPin, active_level: ActiveLevel) -> Self {
        if !pin.is_present() {
            tracing::info!("No charging pin configured, charge status stays unknown");
        }

        Self {
            pin,
            active_level,
            debounce_reads: 1,
            status: ChargeStatus::Unknown,
            pending: None,
            callback: None,
        }
    }

    /// Require `reads` consecutive matching samples before changing state
    pub fn with_debounce(mut self, reads: u8) -> Self {
        self.debounce_reads = reads.max(1);
        self
    }

    /// Register the transition callback, replacing any previous one
    pub fn set_callback(&mut self, callback: ChargeCallback) {
        if self.callback.is_some() {
            tracing::debug!("Replacing charging status callback");
        }
        self.callback = Some(callback);
    }

    pub fn status(&self) -> ChargeStatus {
        self.status
    }

    pub fn is_charging(&self) -> bool {
        self.status == ChargeStatus::Charging
    }

    pub fn is_discharging(&self) -> bool {
        self.status == ChargeStatus::Discharging
    }

    /// Sample the pin and apply a transition if one is due
    ///
    /// Returns the new status when the state changed on this call. Leaving
    /// `Unknown` records the starting level without running the callback.
    pub fn update(&mut self) -> Option<ChargeStatus> {
        let pin = match &mut self.pin {
            ChargingPin::Absent => return None,
            ChargingPin::Present(pin) => pin,
        };

        let candidate = match pin.is_high() {
            Ok(level) => self.active_level.status_for(level),
            Err(e) => {
                tracing::warn!("Charging pin read failed: {}", e);
                self.pending = None;
                return None;
            }
        };

        if candidate == self.status {
            self.pending = None;
            return None;
        }

        let seen = match self.pending {
            Some((status, count)) if status == candidate => count.saturating_add(1),
            _ => 1,
        };

        if seen < self.debounce_reads {
            self.pending = Some((candidate, seen));
            return None;
        }

        self.pending = None;
        let previous = self.status;
        self.status = candidate;

        // The first confirmed level is the starting point, not a transition
        if previous == ChargeStatus::Unknown {
            tracing::info!("Initial charge status: {}", candidate.as_str());
            return Some(candidate);
        }

        tracing::info!(
            "Charge status {} -> {}",
            previous.as_str(),
            candidate.as_str()
        );

        if let Some(callback) = self.callback.as_mut() {
            callback(candidate == ChargeStatus::Charging);
        }

        Some(candidate)
    }
}
