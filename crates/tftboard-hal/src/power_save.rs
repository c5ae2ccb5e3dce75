//! Power-save coordination
//!
//! Toggling power save dims the backlight, puts the panel into its low-power
//! mode and then tells the hosting device logic so radio or CPU policy can
//! follow. Which of the backlight and panel exist is settled when the
//! coordinator is built.

use crate::display::{Backlight, PanelDisplay};

/// Backlight level while power save is on
pub const DEFAULT_POWER_SAVE_BRIGHTNESS: u8 = 10;

/// Hook receiving the mode after local peripherals have been handled
pub type PowerSaveHook = Box<dyn FnMut(bool) + Send>;

pub struct PowerSaveCoordinator {
    backlight: Option<Box<dyn Backlight + Send>>,
    display: Option<Box<dyn PanelDisplay + Send>>,
    power_save_brightness: u8,
    enabled: bool,
    forward: Option<PowerSaveHook>,
}

impl PowerSaveCoordinator {
    pub fn new(
        backlight: Option<Box<dyn Backlight + Send>>,
        display: Option<Box<dyn PanelDisplay + Send>>,
    ) -> Self {
        Self {
            backlight,
            display,
            power_save_brightness: DEFAULT_POWER_SAVE_BRIGHTNESS,
            enabled: false,
            forward: None,
        }
    }

    pub fn with_power_save_brightness(mut self, percent: u8) -> Self {
        self.power_save_brightness = percent.min(100);
        self
    }

    /// Register the device-level hook, replacing any previous one
    pub fn on_power_save_changed<F>(&mut self, hook: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        if self.forward.is_some() {
            tracing::debug!("Replacing power save hook");
        }
        self.forward = Some(Box::new(hook));
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enter or leave power save
    ///
    /// Repeating the current mode does nothing. Returns whether the mode
    /// changed.
    #[allow(clippy::collapsible_if)] // Avoid if-let chains for MSRV 1.85 compatibility
    pub fn set_power_save_mode(&mut self, enabled: bool) -> bool {
        if enabled == self.enabled {
            tracing::debug!("Power save already {}", if enabled { "on" } else { "off" });
            return false;
        }

        tracing::info!("Power save {}", if enabled { "enabled" } else { "disabled" });

        if let Some(backlight) = self.backlight.as_mut() {
            let result = if enabled {
                backlight.set_brightness(self.power_save_brightness)
            } else {
                backlight.restore_brightness()
            };
            if let Err(e) = result {
                tracing::warn!("Failed to update backlight: {}", e);
            }
        }

        if let Some(display) = self.display.as_mut() {
            if let Err(e) = display.set_power_save_mode(enabled) {
                tracing::warn!("Failed to switch display power mode: {}", e);
            }
        }

        self.enabled = enabled;

        if let Some(forward) = self.forward.as_mut() {
            forward(enabled);
        }

        true
    }
}
