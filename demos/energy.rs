use ina228::address::Address;
use ina228::calibration::IntCalibration;
use ina228::diagnostics::{AlertConfiguration, DiagnosticFlags};
use ina228::thresholds::{bus_limit_from_uv, Threshold};
use ina228::SyncIna228;
use linux_embedded_hal::I2cdev;
use std::error::Error;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    // 10A maximum over a 10mOhm shunt
    let calibration = IntCalibration::from_max_current(10_000_000, 10_000).ok_or("Bad calibration")?;

    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna228::new_calibrated(device, Address::from_byte(0x40)?, calibration)?;

    // Latch the alert pin if the bus drops below 11V
    ina.set_threshold(Threshold::BusUndervoltage, bus_limit_from_uv(11_000_000)?)?;
    ina.set_alert_configuration(AlertConfiguration {
        latch: true,
        ..AlertConfiguration::default()
    })?;

    ina.reset_accumulators()?;

    for _ in 0..10 {
        std::thread::sleep(Duration::from_secs(1));

        let energy = ina.energy()?;
        let charge = ina.charge()?;
        println!(
            "Energy: {:.4} J, Charge: {:.4} C",
            energy.joules(),
            charge.coulombs()
        );

        let flags = ina.diagnostics()?;
        if flags.contains(DiagnosticFlags::BUS_UNDER_LIMIT) {
            println!("Bus voltage dropped below 11V");
        }
        if flags.intersects(DiagnosticFlags::ENERGY_OVERFLOW | DiagnosticFlags::CHARGE_OVERFLOW) {
            println!("Accumulator overflowed, resetting");
            ina.reset_accumulators()?;
        }
    }

    Ok(())
}
