//! Integration tests for battery sensing and charge detection

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tftboard_hal::mock::{MockCalibrationCurve, MockHal};
use tftboard_hal::{
    AdcResolution, Attenuation, CalibrationProfile, ChargeStatus, ChargingPin, NO_READING,
    PowerConfig, PowerManager,
};

fn power_manager(hal: &MockHal, config: PowerConfig) -> PowerManager {
    PowerManager::new(
        hal.sampler().unwrap(),
        CalibrationProfile::uncalibrated(Attenuation::Db12, AdcResolution::BITS_12),
        hal.charging_pin(),
        config,
    )
}

#[test]
fn test_first_update_reports_reading() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    let mut power = power_manager(&hal, PowerConfig::default());

    assert_eq!(power.battery_voltage(), NO_READING);

    hal.queue_samples(&[2234]);
    power.update();

    assert_eq!(power.battery_voltage(), 3600);
    assert_eq!(power.battery_level(), 50);
    assert!(power.is_discharging());
}

#[test]
fn test_sampling_failure_keeps_last_value() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    let mut power = power_manager(&hal, PowerConfig::default());

    hal.queue_samples(&[2234]);
    hal.queue_sample_failure();
    power.update();
    power.update();

    assert_eq!(power.battery_voltage(), 3600);
    assert_eq!(power.reading().map(|r| r.raw), Some(2234));
}

#[test]
fn test_charger_plug_and_unplug() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    let mut power = power_manager(&hal, PowerConfig::default());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    power.on_charging_status_changed(move |charging| sink.lock().unwrap().push(charging));

    power.update();
    hal.set_charging_level(true);
    power.update();
    power.update();
    hal.set_charging_level(false);
    power.update();

    assert_eq!(*events.lock().unwrap(), vec![true, false]);
    assert_eq!(power.charge_status(), ChargeStatus::Discharging);
}

#[test]
fn test_pin_failure_holds_state() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    hal.set_charging_level(true);
    let mut power = power_manager(&hal, PowerConfig::default());

    power.update();
    assert!(power.is_charging());

    hal.set_charging_level(false);
    hal.fail_next_pin_reads(2);
    power.update();
    power.update();
    assert!(power.is_charging());

    power.update();
    assert!(power.is_discharging());
}

#[test]
fn test_debounced_transition() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    let config = PowerConfig {
        debounce_reads: 3,
        ..Default::default()
    };
    let mut power = power_manager(&hal, config);

    let transitions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&transitions);
    power.on_charging_status_changed(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..3 {
        power.update();
    }
    assert!(power.is_discharging());

    hal.set_charging_level(true);
    power.update();
    power.update();
    assert!(power.is_discharging());
    power.update();
    assert!(power.is_charging());

    assert_eq!(transitions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_constant_level_then_single_rise() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    let mut power = power_manager(&hal, PowerConfig::default());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    power.on_charging_status_changed(move |charging| sink.lock().unwrap().push(charging));

    for _ in 0..5 {
        power.update();
    }
    assert!(events.lock().unwrap().is_empty());
    assert!(power.is_discharging());

    hal.set_charging_level(true);
    for _ in 0..5 {
        power.update();
    }
    assert_eq!(*events.lock().unwrap(), vec![true]);
}

#[test]
fn test_active_low_charger() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    let config = PowerConfig {
        charging_active_level: tftboard_hal::ActiveLevel::Low,
        ..Default::default()
    };
    let mut power = power_manager(&hal, config);

    hal.set_charging_level(false);
    power.update();
    assert!(power.is_charging());
}

#[test]
fn test_absent_pin_never_reports() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    hal.set_charging_level(true);

    let mut power = PowerManager::new(
        hal.sampler().unwrap(),
        CalibrationProfile::uncalibrated(Attenuation::Db12, AdcResolution::BITS_12),
        ChargingPin::Absent,
        PowerConfig::default(),
    );
    power.update();

    assert!(!power.is_charging());
    assert!(!power.is_discharging());
    assert_eq!(power.battery_level(), 50);
}

#[test]
fn test_calibrated_curve_is_used() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.queue_samples(&[2234]);

    let calibration = CalibrationProfile::new(
        Attenuation::Db12,
        AdcResolution::BITS_12,
        Some(Box::new(MockCalibrationCurve { offset_mv: 50 })),
    );
    assert!(calibration.is_valid());

    let mut power = PowerManager::new(
        hal.sampler().unwrap(),
        calibration,
        ChargingPin::Absent,
        PowerConfig::default(),
    );
    power.update();

    // (1800 + 50) mV sensed, doubled by the divider
    assert_eq!(power.battery_voltage(), 3700);
}

#[test]
fn test_shared_manager_across_threads() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_idle_sample(Some(2234));
    let shared = power_manager(&hal, PowerConfig::default()).into_shared();

    let ticker = Arc::clone(&shared);
    std::thread::spawn(move || {
        for _ in 0..5 {
            ticker.lock().unwrap().update();
        }
    })
    .join()
    .unwrap();

    assert_eq!(shared.lock().unwrap().battery_level(), 50);
}
