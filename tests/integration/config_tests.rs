//! Integration tests for configuration driving the power core

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use tftboard_config::BoardConfig;
use tftboard_hal::mock::MockHal;
use tftboard_hal::{Board, CalibrationProfile, PowerManager, PowerSaveCoordinator};

#[test]
fn test_config_drives_power_manager() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[power]
charging_pin = 4
empty_mv = 3300
full_mv = 4100
critical_battery_threshold = 10
"#
    )
    .unwrap();

    let config = BoardConfig::load(file.path()).unwrap();
    let hal = MockHal::new(&config.board).unwrap();
    hal.queue_samples(&[2234]);

    let calibration =
        CalibrationProfile::uncalibrated(config.adc.attenuation, config.adc.resolution().unwrap());
    let mut power = PowerManager::new(
        hal.sampler().unwrap(),
        calibration,
        hal.charging_pin(),
        config.power.power_config(),
    );
    power.update();

    // 3600 mV in a 3300-4100 band
    assert_eq!(power.battery_level(), 37);
    assert!(!power.is_battery_critical());
    assert!(power.is_discharging());
}

#[test]
fn test_board_profile_file_overrides_id() {
    let dir = TempDir::new().unwrap();
    let profile_path = dir.path().join("board.toml");
    std::fs::write(
        &profile_path,
        r#"
id = "custom-tft"
name = "Custom TFT"
chip = "ESP32-S3"

[display]
width = 240
height = 135
offset_x = 40
offset_y = 52

[capabilities]
display = true
backlight = true
"#,
    )
    .unwrap();

    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("profile_path = {:?}\n", profile_path.display().to_string()),
    )
    .unwrap();

    let config = BoardConfig::load(&config_path).unwrap();
    let board = Board::from_profile_file(config.profile_path.as_deref().unwrap()).unwrap();
    assert_eq!(board.profile().id, "custom-tft");
    assert_eq!(board.profile().display.bits_per_pixel, 16);

    let hal = MockHal::for_board(board);
    assert!(hal.sampler().is_none());

    let mut coordinator = PowerSaveCoordinator::new(hal.backlight(), hal.panel())
        .with_power_save_brightness(config.backlight.power_save_brightness);
    coordinator.set_power_save_mode(true);
    assert!(hal.panel_power_save());
}

#[test]
fn test_layered_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let system = dir.path().join("etc/config.toml");
    let user = dir.path().join("data/config.toml");

    let mut base = BoardConfig::default();
    base.power.charging_pin = Some(4);
    base.save(&system).unwrap();

    std::fs::create_dir_all(user.parent().unwrap()).unwrap();
    std::fs::write(&user, "[backlight]\npower_save_brightness = 0\n").unwrap();

    let config = BoardConfig::load_layered(&system, &user).unwrap();
    assert_eq!(config.power.charging_pin, Some(4));
    assert_eq!(config.backlight.power_save_brightness, 0);
    assert_eq!(config.backlight.default_brightness, 80);
}

#[test]
fn test_unknown_board_rejected() {
    let config = BoardConfig {
        board: "esp32c3-lcd".into(),
        ..Default::default()
    };
    assert!(MockHal::new(&config.board).is_err());
}

#[test]
fn test_status_reading_serializes() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.queue_samples(&[2234]);
    let config = BoardConfig::default();

    let mut power = PowerManager::new(
        hal.sampler().unwrap(),
        CalibrationProfile::uncalibrated(config.adc.attenuation, config.adc.resolution().unwrap()),
        hal.charging_pin(),
        config.power.power_config(),
    );
    power.update();

    let json = serde_json::to_string(&power.status().reading).unwrap();
    assert_eq!(json, r#"{"raw":2234,"millivolts":3600,"percent":50}"#);
}
