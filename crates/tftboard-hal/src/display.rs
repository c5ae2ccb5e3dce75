//! Display and backlight interfaces
//!
//! The panel driver and the backlight PWM live outside this crate. The power
//! core only ever asks the panel to enter or leave its low-power mode and the
//! backlight to dim or go back to the user's saved level.

use crate::DeviceError;

/// Brightness applied at bring-up
pub const DEFAULT_BRIGHTNESS: u8 = 80;

/// Panel driver low-power control
pub trait PanelDisplay {
    fn set_power_save_mode(&mut self, enabled: bool) -> Result<(), DeviceError>;
}

/// Backlight driver
pub trait Backlight {
    /// Apply a temporary brightness (0-100), leaving the saved level alone
    fn set_brightness(&mut self, percent: u8) -> Result<(), DeviceError>;

    /// Go back to the saved brightness
    fn restore_brightness(&mut self) -> Result<(), DeviceError>;

    /// Currently applied brightness (0-100)
    fn brightness(&self) -> u8;
}

/// LEDC-style PWM channel driving the backlight
pub trait PwmOutput {
    fn set_duty(&mut self, duty: u32) -> Result<(), DeviceError>;
    fn max_duty(&self) -> u32;
}

/// PWM backlight with a saved user brightness
#[derive(Debug)]
pub struct PwmBacklight<P: PwmOutput> {
    pwm: P,
    invert: bool,
    saved: u8,
    current: u8,
}

impl<P: PwmOutput> PwmBacklight<P> {
    /// Create the backlight and apply [`DEFAULT_BRIGHTNESS`]
    pub fn new(pwm: P, invert: bool) -> Result<Self, DeviceError> {
        let mut backlight = Self {
            pwm,
            invert,
            saved: DEFAULT_BRIGHTNESS,
            current: 0,
        };
        backlight.set_saved_brightness(DEFAULT_BRIGHTNESS)?;
        Ok(backlight)
    }

    /// Set and remember the user's brightness
    pub fn set_saved_brightness(&mut self, percent: u8) -> Result<(), DeviceError> {
        self.saved = percent.min(100);
        self.apply(self.saved)
    }

    pub fn saved_brightness(&self) -> u8 {
        self.saved
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    fn apply(&mut self, percent: u8) -> Result<(), DeviceError> {
        let percent = percent.min(100);
        let max = self.pwm.max_duty();
        let duty = percent as u32 * max / 100;
        let duty = if self.invert { max - duty } else { duty };

        self.pwm.set_duty(duty)?;
        self.current = percent;
        tracing::debug!("Backlight set to {}% (duty: {})", percent, duty);
        Ok(())
    }
}

impl<P: PwmOutput> Backlight for PwmBacklight<P> {
    fn set_brightness(&mut self, percent: u8) -> Result<(), DeviceError> {
        self.apply(percent)
    }

    fn restore_brightness(&mut self) -> Result<(), DeviceError> {
        self.apply(self.saved)
    }

    fn brightness(&self) -> u8 {
        self.current
    }
}
