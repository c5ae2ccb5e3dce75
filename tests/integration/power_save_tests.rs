//! Integration tests for power-save coordination

use std::sync::{Arc, Mutex};
use tftboard_hal::PowerSaveCoordinator;
use tftboard_hal::mock::MockHal;

fn coordinator(hal: &MockHal) -> PowerSaveCoordinator {
    PowerSaveCoordinator::new(hal.backlight(), hal.panel())
}

#[test]
fn test_peripheral_call_order() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    let mut coordinator = coordinator(&hal);

    assert!(coordinator.set_power_save_mode(true));
    assert!(coordinator.set_power_save_mode(false));

    assert_eq!(
        hal.calls(),
        vec![
            "backlight.set_brightness(10)",
            "display.set_power_save_mode(true)",
            "backlight.restore_brightness()",
            "display.set_power_save_mode(false)",
        ]
    );
}

#[test]
fn test_restore_returns_to_saved_brightness() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    hal.set_default_brightness(65);
    let mut coordinator = coordinator(&hal).with_power_save_brightness(3);

    coordinator.set_power_save_mode(true);
    assert_eq!(hal.brightness(), 3);
    assert!(hal.panel_power_save());

    coordinator.set_power_save_mode(false);
    assert_eq!(hal.brightness(), 65);
    assert!(!hal.panel_power_save());
}

#[test]
fn test_repeated_mode_touches_nothing() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    let mut coordinator = coordinator(&hal);

    assert!(!coordinator.set_power_save_mode(false));
    assert!(hal.calls().is_empty());

    coordinator.set_power_save_mode(true);
    assert!(!coordinator.set_power_save_mode(true));
    assert_eq!(hal.calls().len(), 2);
}

#[test]
fn test_forward_hook_sees_every_change() {
    let hal = MockHal::new("esp32s3-1.14tft").unwrap();
    let mut coordinator = coordinator(&hal);

    let forwarded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&forwarded);
    coordinator.on_power_save_changed(move |enabled| sink.lock().unwrap().push(enabled));

    coordinator.set_power_save_mode(true);
    coordinator.set_power_save_mode(true);
    coordinator.set_power_save_mode(false);

    assert_eq!(*forwarded.lock().unwrap(), vec![true, false]);
}

#[test]
fn test_missing_peripherals_still_forward() {
    let mut coordinator = PowerSaveCoordinator::new(None, None);

    let forwarded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&forwarded);
    coordinator.on_power_save_changed(move |enabled| sink.lock().unwrap().push(enabled));

    assert!(coordinator.set_power_save_mode(true));
    assert!(coordinator.is_enabled());
    assert_eq!(*forwarded.lock().unwrap(), vec![true]);
}

#[test]
fn test_led_variant_dims_without_battery() {
    let hal = MockHal::new("esp32s3-1.14tft-led").unwrap();
    assert!(hal.board().capabilities().supports_power_save());

    let mut coordinator = coordinator(&hal);
    coordinator.set_power_save_mode(true);
    assert_eq!(hal.brightness(), 10);
}
