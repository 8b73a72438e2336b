use ina228::address::Address;
use ina228::SyncIna228;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna228::new(device, Address::from_byte(0x40)?)?;

    // Wait until a result is ready
    std::thread::sleep(ina.configuration()?.conversion_time().unwrap());

    println!("Bus Voltage: {:.4} V", ina.bus_voltage()?.volts());
    println!("Shunt Voltage: {:.3} µV", ina.shunt_voltage()?.microvolts());
    println!("Die Temperature: {:.2} °C", ina.die_temperature()?.celsius());

    Ok(())
}
