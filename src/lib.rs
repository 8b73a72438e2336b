//! Driver for the INA228 85V, 20-bit power, energy and charge monitor from Texas Instruments
//!
//! The INA228 measures shunt voltage, bus voltage and die temperature. Given a calibration it also
//! computes current and power and accumulates energy and charge. All registers are decoded into
//! typed values, see the modules for the encoding of each register.
//!
//! Two drivers with identical APIs are provided, [`SyncIna228`] (feature `sync`) for blocking
//! `embedded-hal` buses and [`AsyncIna228`] (feature `async`) for `embedded-hal-async` buses.
//!
//! # Example
//! ```rust,no_run
//! # #[cfg(feature = "sync")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ina228::address::Address;
//! use ina228::calibration::IntCalibration;
//! use ina228::SyncIna228;
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//!
//! // 10A maximum over a 10mOhm shunt
//! let calibration = IntCalibration::from_max_current(10_000_000, 10_000).unwrap();
//! let mut ina = SyncIna228::new_calibrated(i2c, Address::default(), calibration)
//!     .map_err(|e| format!("{e}"))?;
//!
//! if let Some(m) = ina.next_measurement().map_err(|e| format!("{e}"))? {
//!     println!("Bus voltage: {}mV", m.bus_voltage.voltage_mv());
//!     if let Some(current) = m.current {
//!         println!("Current: {}µA", current.current_ua());
//!     }
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sync"))]
//! # fn main() {}
//! ```
//!
//! # Features
//! - `sync` (default): blocking driver
//! - `async` (default): driver for `embedded-hal-async`
//! - `paranoid` (default): additional checks of the device during initialization and when reading
//!   back the configuration
//! - `std`: implement `std::error::Error` for all errors
//! - `defmt-03`: implement `defmt::Format` for the public types
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(clippy::pedantic)]
#![warn(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]

pub mod address;
pub mod calibration;
pub mod configuration;
pub mod diagnostics;
pub mod errors;
pub mod field;
pub mod measurements;
pub mod register;
pub mod thresholds;

#[cfg(feature = "async")]
mod r#async;

#[cfg(feature = "async")]
pub use r#async::INA228 as AsyncIna228;

#[cfg(feature = "sync")]
mod sync {
    include!(concat!(env!("OUT_DIR"), "/blocking.rs"));
}

#[cfg(feature = "sync")]
pub use sync::INA228 as SyncIna228;
