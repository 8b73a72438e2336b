use ina228::address::{Address, Pin};
use ina228::calibration::IntCalibration;
use ina228::configuration::{
    AccumulatorReset, AdcConfiguration, AdcRange, Averaging, Configuration, ConversionDelay,
    ConversionTime, DeviceConfiguration, OperatingMode, Reset,
};
use ina228::SyncIna228;
use linux_embedded_hal::I2cdev;
use std::error::Error;
use std::time::Duration;

fn main() -> Result<(), Box<dyn Error>> {
    // 2A maximum over a 15mOhm shunt, at most 30mV so the small range fits
    let calibration = IntCalibration::from_max_current(2_000_000, 15_000).ok_or("Bad calibration")?;

    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina =
        SyncIna228::new_calibrated(device, Address::from_pins(Pin::Gnd, Pin::Vs), calibration)?;

    ina.set_configuration(Configuration {
        device: DeviceConfiguration {
            // Do not perform a reset
            reset: Reset::Run,
            reset_accumulators: AccumulatorReset::Keep,
            // Give the supply some time to settle
            conversion_delay: ConversionDelay::from_ms(20).ok_or("Delay too long")?,
            temperature_compensation: false,
            // Four times the resolution, the calibration is adjusted by the driver
            adc_range: AdcRange::Fsr40mv96,
        },
        adc: AdcConfiguration {
            // Measure all signals continuously (default)
            operating_mode: OperatingMode::ContinuousAll,
            // Be extra precise, but take some extra time
            bus_conversion_time: ConversionTime::Us1052,
            shunt_conversion_time: ConversionTime::Us4120,
            temperature_conversion_time: ConversionTime::Us540,
            averaging: Averaging::Avg16,
        },
    })?;

    // Wait for the measurement to be done
    let conversion_time: Duration = ina.configuration()?.conversion_time().unwrap();
    std::thread::sleep(conversion_time);

    let measurements = ina.next_measurement()?.expect("Conversion is done now");
    println!("Bus:     {:.3} V", measurements.bus_voltage.volts());
    println!("Shunt:   {:.3} µV", measurements.shunt_voltage.microvolts());
    println!("Die:     {:.2} °C", measurements.die_temperature.celsius());
    if let Some(current) = measurements.current {
        println!("Current: {:.6} A", current.amperes());
    }
    if let Some(power) = measurements.power {
        println!("Power:   {:.6} W", power.watts());
    }

    Ok(())
}
