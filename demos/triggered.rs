use ina228::address::Address;
use ina228::configuration::{AdcConfiguration, Configuration, OperatingMode};
use ina228::SyncIna228;
use linux_embedded_hal::I2cdev;
use std::error::Error;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna228::new(device, Address::from_byte(0x40)?)?;

    ina.set_configuration(Configuration {
        adc: AdcConfiguration {
            // Only measure if we kindly ask
            operating_mode: OperatingMode::TriggeredAll,
            ..AdcConfiguration::default()
        },
        ..Configuration::default()
    })?;

    // Wait for the measurement to be done
    let conversion_time: Duration = ina.configuration()?.conversion_time().unwrap();
    std::thread::sleep(conversion_time);

    // Writing the configuration started the first measurement
    let measurements = ina.next_measurement()?;
    println!("After configuration: {measurements:?}");
    assert!(measurements.is_some());

    // If we wait and check again there will be no new data
    std::thread::sleep(conversion_time);
    let measurements = ina.next_measurement()?;
    println!("After no trigger: {measurements:?}");
    assert!(measurements.is_none());

    // But we can start a new conversion using a trigger
    ina.trigger()?;

    std::thread::sleep(conversion_time);

    let measurements = ina.next_measurement()?;
    println!("After trigger: {measurements:?}");
    assert!(measurements.is_some());

    Ok(())
}
