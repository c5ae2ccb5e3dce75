//! Mock implementations for testing without real hardware
//!
//! This module provides mock backends for every seam of the power core,
//! allowing development and testing on a desktop without the board attached.
//! All mocks share one [`MockState`] so a test can flip the charger pin or
//! queue ADC samples while the power manager owns the driver objects.
//!
//! # Usage
//!
//! ```no_run
//! use tftboard_hal::mock::MockHal;
//!
//! let hal = MockHal::new("esp32s3-1.14tft").unwrap();
//! hal.set_charging_level(true);
//! hal.queue_samples(&[2234, 2240]);
//! ```

use crate::adc::AdcSampler;
use crate::calibration::CalibrationCurve;
use crate::charge::{ChargePin, ChargingPin};
use crate::display::{Backlight, DEFAULT_BRIGHTNESS, PanelDisplay, PwmOutput};
use crate::{Board, DeviceError};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Environment variable selecting the simulated board
pub const MOCK_BOARD_ENV: &str = "TFTBOARD_MOCK_BOARD";

/// Duty range of the simulated backlight channel (13-bit LEDC timer)
pub const MOCK_PWM_MAX_DUTY: u32 = 8191;

/// Shared mock state for synchronized access
#[derive(Debug)]
pub struct MockState {
    /// Queued ADC results, `None` simulates a failed read
    pub samples: VecDeque<Option<u16>>,
    /// Sample returned once the queue is empty
    pub idle_sample: Option<u16>,
    /// Charging pin level
    pub charging_level: bool,
    /// Pin read failures still to inject
    pub pin_failures: u32,
    /// Applied backlight brightness (0-100)
    pub brightness: u8,
    /// Saved backlight brightness (0-100)
    pub saved_brightness: u8,
    /// Last duty written to the backlight PWM channel
    pub pwm_duty: u32,
    /// Panel low-power mode
    pub panel_power_save: bool,
    /// Every peripheral call, in order
    pub calls: Vec<String>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::new(),
            idle_sample: None,
            charging_level: false,
            pin_failures: 0,
            brightness: DEFAULT_BRIGHTNESS,
            saved_brightness: DEFAULT_BRIGHTNESS,
            pwm_duty: 0,
            panel_power_save: false,
            calls: Vec::new(),
        }
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock ADC channel replaying queued samples
pub struct MockSampler {
    state: Arc<RwLock<MockState>>,
}

impl MockSampler {
    pub fn new(state: Arc<RwLock<MockState>>) -> Self {
        Self { state }
    }
}

impl AdcSampler for MockSampler {
    fn read(&mut self) -> Result<u16, DeviceError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DeviceError::SamplingFailed("mock state poisoned".into()))?;

        let next = match state.samples.pop_front() {
            Some(sample) => sample,
            None => state.idle_sample,
        };

        next.ok_or_else(|| DeviceError::SamplingFailed("[MOCK] no sample".into()))
    }
}

/// Mock calibration curve: linear with a fixed offset
#[derive(Debug, Clone, Copy)]
pub struct MockCalibrationCurve {
    pub offset_mv: i32,
}

impl CalibrationCurve for MockCalibrationCurve {
    fn raw_to_millivolts(&self, raw: u16) -> Option<u32> {
        let mv = crate::calibration::linear_millivolts(raw) as i32 + self.offset_mv;
        u32::try_from(mv).ok()
    }
}

/// Mock charger status pin
pub struct MockChargePin {
    state: Arc<RwLock<MockState>>,
}

impl MockChargePin {
    pub fn new(state: Arc<RwLock<MockState>>) -> Self {
        Self { state }
    }
}

impl ChargePin for MockChargePin {
    fn is_high(&mut self) -> Result<bool, DeviceError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| DeviceError::PinReadFailed("mock state poisoned".into()))?;

        if state.pin_failures > 0 {
            state.pin_failures -= 1;
            return Err(DeviceError::PinReadFailed("[MOCK] injected failure".into()));
        }

        Ok(state.charging_level)
    }
}

/// Mock backlight recording every call
pub struct MockBacklight {
    state: Arc<RwLock<MockState>>,
}

impl MockBacklight {
    pub fn new(state: Arc<RwLock<MockState>>) -> Self {
        Self { state }
    }
}

impl Backlight for MockBacklight {
    fn set_brightness(&mut self, percent: u8) -> Result<(), DeviceError> {
        let percent = percent.min(100);
        if let Ok(mut state) = self.state.write() {
            state.brightness = percent;
            state.calls.push(format!("backlight.set_brightness({percent})"));
        }
        tracing::debug!("[MOCK] Brightness set to {}", percent);
        Ok(())
    }

    fn restore_brightness(&mut self) -> Result<(), DeviceError> {
        if let Ok(mut state) = self.state.write() {
            state.brightness = state.saved_brightness;
            state.calls.push("backlight.restore_brightness()".into());
        }
        tracing::debug!("[MOCK] Brightness restored");
        Ok(())
    }

    fn brightness(&self) -> u8 {
        self.state
            .read()
            .map(|s| s.brightness)
            .unwrap_or(DEFAULT_BRIGHTNESS)
    }
}

/// Mock LEDC channel behind [`crate::PwmBacklight`]
pub struct MockPwm {
    state: Arc<RwLock<MockState>>,
}

impl MockPwm {
    pub fn new(state: Arc<RwLock<MockState>>) -> Self {
        Self { state }
    }
}

impl PwmOutput for MockPwm {
    fn set_duty(&mut self, duty: u32) -> Result<(), DeviceError> {
        let duty = duty.min(MOCK_PWM_MAX_DUTY);
        if let Ok(mut state) = self.state.write() {
            state.pwm_duty = duty;
            state.calls.push(format!("pwm.set_duty({duty})"));
        }
        tracing::debug!("[MOCK] PWM duty set to {}", duty);
        Ok(())
    }

    fn max_duty(&self) -> u32 {
        MOCK_PWM_MAX_DUTY
    }
}

/// Mock panel driver
pub struct MockPanel {
    state: Arc<RwLock<MockState>>,
}

impl MockPanel {
    pub fn new(state: Arc<RwLock<MockState>>) -> Self {
        Self { state }
    }
}

impl PanelDisplay for MockPanel {
    fn set_power_save_mode(&mut self, enabled: bool) -> Result<(), DeviceError> {
        if let Ok(mut state) = self.state.write() {
            state.panel_power_save = enabled;
            state.calls.push(format!("display.set_power_save_mode({enabled})"));
        }
        tracing::debug!("[MOCK] Panel power save: {}", enabled);
        Ok(())
    }
}

/// Complete mock HAL for testing
///
/// Hands out driver objects for whatever the board profile says is wired.
pub struct MockHal {
    board: Board,
    state: Arc<RwLock<MockState>>,
}

impl MockHal {
    /// Create a mock HAL for one of the built-in boards
    pub fn new(board_id: &str) -> Result<Self, DeviceError> {
        Ok(Self::for_board(Board::from_id(board_id)?))
    }

    pub fn for_board(board: Board) -> Self {
        Self {
            board,
            state: Arc::new(RwLock::new(MockState::new())),
        }
    }

    /// Create from [`MOCK_BOARD_ENV`], falling back to `default_id`
    pub fn from_env_or(default_id: &str) -> Result<Self, DeviceError> {
        match std::env::var(MOCK_BOARD_ENV) {
            Ok(id) => {
                tracing::info!("[MOCK] Board selected by {}: {}", MOCK_BOARD_ENV, id);
                Self::new(&id)
            }
            Err(_) => Self::new(default_id),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get shared state for manipulation in tests
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        Arc::clone(&self.state)
    }

    pub fn sampler(&self) -> Option<Box<dyn AdcSampler + Send>> {
        if !self.board.capabilities().battery_adc {
            return None;
        }
        Some(Box::new(MockSampler::new(self.state())))
    }

    pub fn charging_pin(&self) -> ChargingPin {
        if self.board.capabilities().charging_pin {
            ChargingPin::Present(Box::new(MockChargePin::new(self.state())))
        } else {
            ChargingPin::Absent
        }
    }

    pub fn backlight(&self) -> Option<Box<dyn Backlight + Send>> {
        if !self.board.capabilities().backlight {
            return None;
        }
        Some(Box::new(MockBacklight::new(self.state())))
    }

    /// Raw PWM channel for boards with a backlight
    pub fn pwm(&self) -> Option<MockPwm> {
        if !self.board.capabilities().backlight {
            return None;
        }
        Some(MockPwm::new(self.state()))
    }

    pub fn panel(&self) -> Option<Box<dyn PanelDisplay + Send>> {
        if !self.board.capabilities().display {
            return None;
        }
        Some(Box::new(MockPanel::new(self.state())))
    }

    /// Queue raw samples for upcoming reads
    pub fn queue_samples(&self, samples: &[u16]) {
        if let Ok(mut state) = self.state.write() {
            state.samples.extend(samples.iter().copied().map(Some));
        }
    }

    /// Queue one failed ADC read
    pub fn queue_sample_failure(&self) {
        if let Ok(mut state) = self.state.write() {
            state.samples.push_back(None);
        }
    }

    /// Sample returned when the queue runs dry
    pub fn set_idle_sample(&self, sample: Option<u16>) {
        if let Ok(mut state) = self.state.write() {
            state.idle_sample = sample;
        }
    }

    /// Simulate the charger status line
    pub fn set_charging_level(&self, high: bool) {
        if let Ok(mut state) = self.state.write() {
            state.charging_level = high;
        }
    }

    pub fn fail_next_pin_reads(&self, count: u32) {
        if let Ok(mut state) = self.state.write() {
            state.pin_failures = count;
        }
    }

    /// Brightness applied at bring-up and restored after power save
    pub fn set_default_brightness(&self, percent: u8) {
        if let Ok(mut state) = self.state.write() {
            state.brightness = percent.min(100);
            state.saved_brightness = percent.min(100);
        }
    }

    pub fn brightness(&self) -> u8 {
        self.state.read().map(|s| s.brightness).unwrap_or(0)
    }

    pub fn pwm_duty(&self) -> u32 {
        self.state.read().map(|s| s.pwm_duty).unwrap_or(0)
    }

    pub fn panel_power_save(&self) -> bool {
        self.state.read().map(|s| s.panel_power_save).unwrap_or(false)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.read().map(|s| s.calls.clone()).unwrap_or_default()
    }
}
