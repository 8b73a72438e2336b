//! Errors that can be returned by the different functions

use crate::configuration::Configuration;
use crate::field::Field;
use crate::measurements::Measurements;
use crate::register::RegisterName;
use core::fmt::{Debug, Display, Formatter};

/// A value did not fit into the register field it was meant for
///
/// The INA228 itself would silently drop the upper bits, the driver refuses instead. See
/// [`Field::pack_truncating`] for the device behavior.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct CodecRangeError {
    /// The field the value was packed into
    pub field: Field,
    /// The rejected value
    pub value: i64,
}

impl Display for CodecRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Value {} does not fit into a {} bit {} field, should be in range: {}..={}",
            self.value,
            self.field.width(),
            if self.field.is_signed() {
                "signed"
            } else {
                "unsigned"
            },
            self.field.min(),
            self.field.max(),
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecRangeError {}

/// Error returned when the initialization failed, this hands back the bus device
pub struct InitializationError<I2C, I2cErr> {
    /// What went wrong
    pub reason: InitializationErrorReason<I2cErr>,
    /// The bus device the driver was constructed with
    pub device: I2C,
}

impl<I2C, E> InitializationError<I2C, E> {
    pub(crate) const fn new(reason: InitializationErrorReason<E>, device: I2C) -> Self {
        Self { reason, device }
    }
}

impl<I2C, E: Debug> Debug for InitializationError<I2C, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InitializationError")
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl<I2C, E: Debug> Display for InitializationError<I2C, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        Display::fmt(&self.reason, f)
    }
}

#[cfg(feature = "std")]
impl<I2C, I2cErr> std::error::Error for InitializationError<I2C, I2cErr>
where
    I2cErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// Error conditions that can appear during initialization
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum InitializationErrorReason<I2cErr> {
    /// An I2C read or write failed
    I2cError(I2cErr),
    /// The configuration was not the default value after a reset
    ConfigurationNotDefaultAfterReset,
    /// A register was not zero when it was expected to be after reset
    RegisterNotZeroAfterReset(RegisterName),
    /// The manufacturer ID did not read as Texas Instruments
    UnexpectedManufacturer(u16),
    /// The die ID did not read as INA228
    UnexpectedDevice(u16),
}

impl<E> From<E> for InitializationErrorReason<E> {
    fn from(value: E) -> Self {
        Self::I2cError(value)
    }
}

#[cfg(feature = "std")]
impl<I2cErr> std::error::Error for InitializationErrorReason<I2cErr>
where
    I2cErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::I2cError(err) => Some(err),
            Self::ConfigurationNotDefaultAfterReset
            | Self::RegisterNotZeroAfterReset(_)
            | Self::UnexpectedManufacturer(_)
            | Self::UnexpectedDevice(_) => None,
        }
    }
}

impl<I2cErr: Debug> Display for InitializationErrorReason<I2cErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2cError(err) => write!(f, "I2C error: {err:?}"),
            Self::ConfigurationNotDefaultAfterReset => {
                write!(f, "Configuration was not default after reset")
            }
            Self::RegisterNotZeroAfterReset(reg) => {
                write!(f, "Register {reg:?} was not zero after reset")
            }
            Self::UnexpectedManufacturer(id) => {
                write!(f, "Manufacturer ID {id:#06x} is not Texas Instruments")
            }
            Self::UnexpectedDevice(id) => write!(f, "Die ID {id:#05x} is not an INA228"),
        }
    }
}

/// Errors that can happen when a measurement is read
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum MeasurementError<I2cErr> {
    /// An I2C read or write failed
    I2cError(I2cErr),
    /// Current, power, energy or charge were requested but the driver has no calibration
    NotCalibrated,
    /// The INA228 reported a math overflow, current and power are left out
    MathOverflow(Measurements),
}

impl<E> From<E> for MeasurementError<E> {
    fn from(value: E) -> Self {
        Self::I2cError(value)
    }
}

#[cfg(feature = "std")]
impl<I2cErr> std::error::Error for MeasurementError<I2cErr>
where
    I2cErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::I2cError(err) => Some(err),
            Self::NotCalibrated | Self::MathOverflow(_) => None,
        }
    }
}

impl<I2cErr: Debug> Display for MeasurementError<I2cErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2cError(err) => write!(f, "I2C error: {err:?}"),
            Self::NotCalibrated => write!(
                f,
                "No calibration set, current, power, energy and charge can not be decoded"
            ),
            Self::MathOverflow(Measurements {
                shunt_voltage,
                bus_voltage,
                ..
            }) => write!(
                f,
                "Math overflow for shunt voltage {shunt_voltage:?} and bus voltage {bus_voltage:?}"
            ),
        }
    }
}

/// Errors that can happen when the configuration is read
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum ConfigurationReadError<I2cErr> {
    /// The I2C read failed
    I2cError(I2cErr),
    /// The read configuration did not match the saved configuration
    ConfigurationMismatch {
        /// Configuration read from the device
        read: Configuration,
        /// Configuration saved in the driver
        saved: Configuration,
    },
}

impl<E> From<E> for ConfigurationReadError<E> {
    fn from(value: E) -> Self {
        Self::I2cError(value)
    }
}

impl<E: Debug> Display for ConfigurationReadError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2cError(err) => write!(f, "I2C error: {err:?}"),
            Self::ConfigurationMismatch { read, saved } => write!(
                f,
                "Configuration read from device {read:?} did not match saved configuration {saved:?}",
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<I2cErr> std::error::Error for ConfigurationReadError<I2cErr>
where
    I2cErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::I2cError(err) => Some(err),
            Self::ConfigurationMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::fields;

    #[test]
    fn range_error_message() {
        let err = fields::SHUNT_CALIBRATION.pack(0, 40_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value 40000 does not fit into a 15 bit unsigned field, should be in range: 0..=32767"
        );

        let err = fields::SHUNT_LIMIT.pack(0, -40_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value -40000 does not fit into a 16 bit signed field, should be in range: -32768..=32767"
        );
    }

    #[test]
    fn measurement_error_from_bus_error() {
        let err: MeasurementError<u8> = 7.into();
        assert_eq!(err, MeasurementError::I2cError(7));
        assert_eq!(err.to_string(), "I2C error: 7");
    }
}
