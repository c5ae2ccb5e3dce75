//! tftboard init
//!
//! Composition root for the power core. Builds every peripheral handle once,
//! hands them to their single owner and then drives the periodic update tick.
//!
//! Boot sequence:
//! 1. Load configuration
//! 2. Resolve the board profile and bring up its peripherals
//! 3. Wire the power manager and the power-save coordinator
//! 4. Tick `update()` until interrupted

use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tftboard_config::BoardConfig;
use tftboard_hal::mock::MockHal;
use tftboard_hal::{
    Backlight, Board, CalibrationProfile, ChargeStatus, ChargingPin, PowerManager,
    PowerSaveCoordinator, PowerStatus, PwmBacklight, SharedPowerManager,
};
use tracing::{debug, info, warn};

/// Raw sample the simulated battery line settles on (about 3.6 V at the cell)
const SIMULATED_IDLE_SAMPLE: u16 = 2234;

/// Boot stages for timing
#[derive(Debug, Clone, Copy)]
enum BootStage {
    Config,
    Hardware,
    Power,
}

impl BootStage {
    fn name(&self) -> &'static str {
        match self {
            BootStage::Config => "config",
            BootStage::Hardware => "hardware",
            BootStage::Power => "power",
        }
    }
}

/// Peripherals brought up before the power core is wired
struct Hardware {
    hal: MockHal,
    backlight: Option<Box<dyn Backlight + Send>>,
}

/// Everything the update loop needs
struct Runtime {
    power: Option<SharedPowerManager>,
    power_save: Arc<Mutex<PowerSaveCoordinator>>,
    interval: Duration,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let boot_start = Instant::now();

    // Setup logging
    setup_logging();

    info!("tftboard init starting...");

    let stage_start = Instant::now();
    let config = BoardConfig::load_default().context("Failed to load board configuration")?;
    log_stage_complete(BootStage::Config, stage_start);

    let stage_start = Instant::now();
    let Hardware { hal, backlight } = initialize_hardware(&config)?;
    log_stage_complete(BootStage::Hardware, stage_start);

    let stage_start = Instant::now();
    let runtime = initialize_power(&config, &hal, backlight)?;
    log_stage_complete(BootStage::Power, stage_start);

    info!("Boot complete in {:?}", boot_start.elapsed());

    main_loop(runtime).await
}

/// Setup logging to console
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_ansi(false))
        .init();
}

/// Resolve the board and bring up its (simulated) peripherals
///
/// `TFTBOARD_MOCK_BOARD` overrides the configured board id; a profile file
/// overrides both.
fn initialize_hardware(config: &BoardConfig) -> Result<Hardware> {
    info!("Initializing hardware...");

    let hal = match &config.profile_path {
        Some(path) => MockHal::for_board(
            Board::from_profile_file(path)
                .with_context(|| format!("Failed to load board profile {}", path.display()))?,
        ),
        None => MockHal::from_env_or(&config.board).with_context(|| {
            format!(
                "Unknown board (configured: {}, known: {})",
                config.board,
                Board::known_ids().join(", ")
            )
        })?,
    };

    let profile = hal.board().profile();
    info!(
        "Board: {} ({}, {}x{} panel)",
        profile.name, profile.chip, profile.display.width, profile.display.height
    );

    if profile.capabilities.battery_adc {
        let resolution = config
            .adc
            .resolution()
            .context("Invalid ADC configuration")?;
        info!(
            "Battery sense on ADC1 channel {} ({} attenuation, full scale {})",
            config.adc.channel,
            config.adc.attenuation.as_str(),
            resolution.full_scale()
        );
        hal.set_idle_sample(Some(SIMULATED_IDLE_SAMPLE));
    }

    let backlight = match hal.pwm() {
        Some(pwm) => {
            let mut backlight = PwmBacklight::new(pwm, config.backlight.output_invert)
                .context("Failed to initialize backlight")?;
            backlight
                .set_saved_brightness(config.backlight.default_brightness)
                .context("Failed to apply default brightness")?;
            Some(Box::new(backlight) as Box<dyn Backlight + Send>)
        }
        None => None,
    };

    Ok(Hardware { hal, backlight })
}

/// Wire the power manager and power-save coordinator
fn initialize_power(
    config: &BoardConfig,
    hal: &MockHal,
    backlight: Option<Box<dyn Backlight + Send>>,
) -> Result<Runtime> {
    let capabilities = hal.board().capabilities();

    let charging_pin = match config.power.charging_pin {
        Some(gpio) if capabilities.charging_pin => {
            info!("Charging detection on GPIO{}", gpio);
            hal.charging_pin()
        }
        Some(gpio) => {
            warn!(
                "GPIO{} configured for charging detection but board has no charger status line",
                gpio
            );
            ChargingPin::Absent
        }
        None => ChargingPin::Absent,
    };

    let power = match hal.sampler() {
        Some(sampler) => {
            let resolution = config
                .adc
                .resolution()
                .context("Invalid ADC configuration")?;
            // No eFuse calibration data is available off-target
            let calibration = CalibrationProfile::uncalibrated(config.adc.attenuation, resolution);

            let mut manager = PowerManager::new(
                sampler,
                calibration,
                charging_pin,
                config.power.power_config(),
            );
            manager.on_charging_status_changed(|charging| {
                info!(
                    "Charger {}",
                    if charging { "connected" } else { "disconnected" }
                );
            });
            Some(manager.into_shared())
        }
        None => {
            warn!("Board has no battery sensing, power manager disabled");
            None
        }
    };

    let mut coordinator = PowerSaveCoordinator::new(backlight, hal.panel())
        .with_power_save_brightness(config.backlight.power_save_brightness);
    coordinator.on_power_save_changed(|enabled| {
        // Radio sleep and CPU frequency policy hang off this
        debug!("Device power save forwarded: {}", enabled);
    });

    Ok(Runtime {
        power,
        power_save: Arc::new(Mutex::new(coordinator)),
        interval: Duration::from_millis(config.power.update_interval_ms),
    })
}

/// Power-save mode the device should be in for `status`
fn power_save_wanted(status: &PowerStatus, current: bool) -> bool {
    if status.charge == ChargeStatus::Charging {
        false
    } else if status.critical {
        true
    } else {
        current
    }
}

/// Run one tick: update the power manager, then apply the power-save policy
fn tick(runtime: &Runtime) {
    let Some(power) = &runtime.power else {
        return;
    };

    let status = match power.lock() {
        Ok(mut manager) => {
            manager.update();
            manager.status()
        }
        Err(_) => {
            warn!("Power manager lock poisoned, skipping tick");
            return;
        }
    };

    match runtime.power_save.lock() {
        Ok(mut coordinator) => {
            let wanted = power_save_wanted(&status, coordinator.is_enabled());
            coordinator.set_power_save_mode(wanted);
        }
        Err(_) => {
            warn!("Power save lock poisoned, skipping policy");
        }
    }
}

/// Main loop - tick until Ctrl-C
async fn main_loop(runtime: Runtime) -> Result<()> {
    let mut interval = tokio::time::interval(runtime.interval);

    loop {
        tokio::select! {
            _ = interval.tick() => tick(&runtime),
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for shutdown signal")?;
                info!("Received shutdown signal");
                return Ok(());
            }
        }
    }
}

/// Log stage completion with timing
fn log_stage_complete(stage: BootStage, start: Instant) {
    info!("Stage {} complete in {:?}", stage.name(), start.elapsed());
}
