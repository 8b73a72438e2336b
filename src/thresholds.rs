//! Alert limit registers
//!
//! The driver passes the six limit registers through as raw 16 bit values. The helpers in this
//! module convert physical units into the resolution of each register and back, they have to be
//! called by the user explicitly.
//!
//! ```rust
//! use ina228::configuration::AdcRange;
//! use ina228::thresholds::{bus_limit_from_uv, shunt_limit_from_nv, temperature_limit_from_mc};
//!
//! // 12V
//! assert_eq!(bus_limit_from_uv(12_000_000), Ok(3_840));
//! // 40mV, 5µV per LSB in the wide range
//! assert_eq!(shunt_limit_from_nv(40_000_000, AdcRange::Fsr163mv84), Ok(8_000));
//! // -40°C
//! assert_eq!(temperature_limit_from_mc(-40_000), Ok(0xEC00));
//! ```

use crate::calibration::CalibrationContext;
use crate::configuration::AdcRange;
use crate::errors::CodecRangeError;
use crate::field::Field;
use crate::register::{fields, RegisterName};

/// One of the limit registers
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Threshold {
    /// `SOVL`, signed, compared against the shunt voltage
    ShuntOvervoltage,
    /// `SUVL`, signed, compared against the shunt voltage
    ShuntUndervoltage,
    /// `BOVL`, 15 bits, compared against the bus voltage
    BusOvervoltage,
    /// `BUVL`, 15 bits, compared against the bus voltage
    BusUndervoltage,
    /// `TEMP_LIMIT`, signed, compared against the die temperature
    TemperatureOverLimit,
    /// `PWR_LIMIT`, compared against the power
    PowerOverLimit,
}

impl Threshold {
    /// All limit registers
    pub const ALL: [Self; 6] = [
        Self::ShuntOvervoltage,
        Self::ShuntUndervoltage,
        Self::BusOvervoltage,
        Self::BusUndervoltage,
        Self::TemperatureOverLimit,
        Self::PowerOverLimit,
    ];

    /// The register holding this limit
    #[must_use]
    pub const fn register(self) -> RegisterName {
        match self {
            Self::ShuntOvervoltage => RegisterName::ShuntOvervoltageThreshold,
            Self::ShuntUndervoltage => RegisterName::ShuntUndervoltageThreshold,
            Self::BusOvervoltage => RegisterName::BusOvervoltageThreshold,
            Self::BusUndervoltage => RegisterName::BusUndervoltageThreshold,
            Self::TemperatureOverLimit => RegisterName::TemperatureOverLimitThreshold,
            Self::PowerOverLimit => RegisterName::PowerOverLimitThreshold,
        }
    }

    /// Layout of the value inside the register
    #[must_use]
    pub const fn field(self) -> Field {
        match self {
            Self::ShuntOvervoltage | Self::ShuntUndervoltage => fields::SHUNT_LIMIT,
            Self::BusOvervoltage | Self::BusUndervoltage => fields::BUS_LIMIT,
            Self::TemperatureOverLimit => fields::TEMPERATURE_LIMIT,
            Self::PowerOverLimit => fields::POWER_LIMIT,
        }
    }

    /// Value of the register after a reset
    ///
    /// Over limits start at their maximum, under limits at their minimum so that no alert fires.
    #[must_use]
    pub const fn reset_value(self) -> u16 {
        match self {
            Self::ShuntOvervoltage | Self::BusOvervoltage | Self::TemperatureOverLimit => 0x7FFF,
            Self::ShuntUndervoltage => 0x8000,
            Self::BusUndervoltage => 0x0000,
            Self::PowerOverLimit => 0xFFFF,
        }
    }
}

/// Shunt limit LSB in nV, 16 times the shunt voltage LSB
const fn shunt_limit_lsb_nv(range: AdcRange) -> i64 {
    match range {
        AdcRange::Fsr163mv84 => 5_000,
        AdcRange::Fsr40mv96 => 1_250,
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn pack(field: Field, value: i64) -> Result<u16, CodecRangeError> {
    match field.pack(0, value) {
        Ok(bits) => Ok(bits as u16),
        Err(e) => Err(e),
    }
}

/// Register value for a shunt voltage limit in nV, truncated towards zero
///
/// # Errors
/// Returns an error if the limit is outside of the ADC range.
pub const fn shunt_limit_from_nv(nv: i64, range: AdcRange) -> Result<u16, CodecRangeError> {
    pack(fields::SHUNT_LIMIT, nv / shunt_limit_lsb_nv(range))
}

/// Shunt voltage limit in nV for a register value
#[must_use]
pub const fn shunt_limit_nv(bits: u16, range: AdcRange) -> i64 {
    fields::SHUNT_LIMIT.unpack(bits as u64) * shunt_limit_lsb_nv(range)
}

/// Register value for a bus voltage limit in µV, 3.125mV per LSB, truncated
///
/// # Errors
/// Returns an error for limits of 102.4V and above.
#[allow(clippy::cast_possible_wrap)]
pub const fn bus_limit_from_uv(uv: u32) -> Result<u16, CodecRangeError> {
    pack(fields::BUS_LIMIT, (uv / 3_125) as i64)
}

/// Bus voltage limit in µV for a register value
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn bus_limit_uv(bits: u16) -> u32 {
    fields::BUS_LIMIT.extract(bits as u64) as u32 * 3_125
}

/// Register value for a temperature limit in m°C, 7.8125m°C per LSB, truncated towards zero
///
/// # Errors
/// Returns an error for limits outside of ±256°C.
pub const fn temperature_limit_from_mc(milli_celsius: i32) -> Result<u16, CodecRangeError> {
    pack(fields::TEMPERATURE_LIMIT, milli_celsius as i64 * 16 / 125)
}

/// Temperature limit in m°C for a register value, truncated towards zero
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn temperature_limit_mc(bits: u16) -> i32 {
    (fields::TEMPERATURE_LIMIT.unpack(bits as u64) * 125 / 16) as i32
}

/// Register value for a power limit in µW, the LSB is 256 times the power LSB, truncated
///
/// # Errors
/// Returns an error if the limit does not fit into 16 bits with this calibration.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const fn power_limit_from_uw(
    uw: u64,
    context: CalibrationContext,
) -> Result<u16, CodecRangeError> {
    let lsb_pw = 256 * context.power_lsb_pw() as u128;
    let raw = uw as u128 * 1_000_000 / lsb_pw;
    if raw > i64::MAX as u128 {
        return Err(CodecRangeError {
            field: fields::POWER_LIMIT,
            value: i64::MAX,
        });
    }
    pack(fields::POWER_LIMIT, raw as i64)
}

/// Power limit in µW for a register value, truncated
#[must_use]
pub const fn power_limit_uw(bits: u16, context: CalibrationContext) -> u128 {
    bits as u128 * 256 * context.power_lsb_pw() as u128 / 1_000_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_are_consecutive() {
        for (i, threshold) in Threshold::ALL.iter().enumerate() {
            assert_eq!(threshold.register().address(), 0x0C + i as u8);
            assert_eq!(
                threshold.register().fields()[0].field,
                threshold.field(),
                "{threshold:?}"
            );
        }
    }

    #[test]
    fn shunt_limit_follows_range() {
        assert_eq!(shunt_limit_from_nv(5_000, AdcRange::Fsr163mv84), Ok(1));
        assert_eq!(shunt_limit_from_nv(5_000, AdcRange::Fsr40mv96), Ok(4));
        assert_eq!(shunt_limit_from_nv(-10_000, AdcRange::Fsr163mv84), Ok(0xFFFE));
        assert_eq!(shunt_limit_nv(0xFFFE, AdcRange::Fsr163mv84), -10_000);
        assert_eq!(shunt_limit_nv(0x7FFF, AdcRange::Fsr40mv96), 40_958_750);
        assert!(shunt_limit_from_nv(50_000_000, AdcRange::Fsr40mv96).is_err());
    }

    #[test]
    fn bus_limit() {
        assert_eq!(bus_limit_from_uv(3_125), Ok(1));
        assert_eq!(bus_limit_uv(0x7FFF), 102_396_875);
        assert_eq!(bus_limit_uv(0xFFFF), 102_396_875);
        assert!(bus_limit_from_uv(102_400_000).is_err());
    }

    #[test]
    fn temperature_limit() {
        assert_eq!(temperature_limit_from_mc(85_000), Ok(10_880));
        assert_eq!(temperature_limit_mc(10_880), 85_000);
        assert_eq!(temperature_limit_mc(0x7FFF), 255_992);
        assert!(temperature_limit_from_mc(256_000).is_err());
    }

    #[test]
    fn power_limit() {
        let ctx = CalibrationContext::new(1_000).unwrap();
        // 256 * 3.2µW = 819.2µW per LSB
        assert_eq!(power_limit_from_uw(819_200, ctx), Ok(1_000));
        assert_eq!(power_limit_uw(1_000, ctx), 819_200);
        assert!(power_limit_from_uw(u64::MAX, ctx).is_err());
    }

    #[test]
    fn reset_values_never_alert() {
        for threshold in Threshold::ALL {
            let field = threshold.field();
            let value = field.unpack(u64::from(threshold.reset_value()));
            let expected = match threshold {
                Threshold::ShuntUndervoltage | Threshold::BusUndervoltage => field.min(),
                _ => field.max(),
            };
            assert_eq!(value, expected, "{threshold:?}");
        }
    }
}
