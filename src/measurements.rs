//! Decoded measurements of the INA228
//!
//! The raw register types (`*Register`) are what the driver reads from the bus. The measurement
//! types combine them with what is needed to interpret them, the ADC range for the shunt voltage or
//! the [`CalibrationContext`] for everything the device calculates itself.
//!
//! # Example
//! ```rust
//! use ina228::configuration::AdcRange;
//! use ina228::measurements::{ShuntVoltage, ShuntVoltageRegister};
//!
//! let reg = ShuntVoltageRegister(0x00_0010);
//! assert_eq!(ShuntVoltage::from_register(reg, AdcRange::Fsr40mv96).shunt_voltage_pv(), 78_125);
//! assert_eq!(ShuntVoltage::from_register(reg, AdcRange::Fsr163mv84).shunt_voltage_pv(), 312_500);
//! ```
#![allow(clippy::module_name_repetitions)]

use crate::calibration::CalibrationContext;
use crate::configuration::AdcRange;
use crate::register::{fields, ReadRegister, Register, RegisterName};

/// Define a newtype for the raw contents of a measurement register
macro_rules! raw_register {
    ($(#[$meta:meta])* $name:ident($inner:ty) => $register:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
        #[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
        pub struct $name(pub $inner);

        impl Register for $name {
            const NAME: RegisterName = RegisterName::$register;
        }

        impl ReadRegister for $name {
            #[allow(clippy::cast_possible_truncation)]
            fn from_bits(bits: u64) -> Self {
                Self((bits & RegisterName::$register.width().mask()) as $inner)
            }
        }
    };
}

raw_register!(
    /// Contents of the `VSHUNT` register, 24 bits
    ShuntVoltageRegister(u32) => ShuntVoltage
);
raw_register!(
    /// Contents of the `VBUS` register, 24 bits
    BusVoltageRegister(u32) => BusVoltage
);
raw_register!(
    /// Contents of the `DIETEMP` register
    DieTemperatureRegister(u16) => DieTemperature
);
raw_register!(
    /// Contents of the `CURRENT` register, 24 bits
    CurrentRegister(u32) => Current
);
raw_register!(
    /// Contents of the `POWER` register, 24 bits
    PowerRegister(u32) => Power
);
raw_register!(
    /// Contents of the `ENERGY` register, 40 bits
    EnergyRegister(u64) => Energy
);
raw_register!(
    /// Contents of the `CHARGE` register, 40 bits
    ChargeRegister(u64) => Charge
);

/// A collection of the measurements of one conversion
///
/// Current and power are only present if the driver has a calibration.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Measurements {
    /// Voltage across the shunt
    pub shunt_voltage: ShuntVoltage,
    /// Voltage on VBUS
    pub bus_voltage: BusVoltage,
    /// Internal die temperature
    pub die_temperature: DieTemperature,
    /// Current through the shunt, `None` without calibration
    pub current: Option<Current>,
    /// Power delivered to the load, `None` without calibration
    pub power: Option<Power>,
}

/// A shunt voltage measurement
///
/// The resolution depends on the ADC range the measurement was taken in, 312.5nV for ±163.84mV
/// and 78.125nV for ±40.96mV.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ShuntVoltage {
    raw: i32,
    range: AdcRange,
}

impl ShuntVoltage {
    /// Decode the register, `range` is the ADC range that was active during the conversion
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 20 bits
    pub const fn from_register(reg: ShuntVoltageRegister, range: AdcRange) -> Self {
        Self {
            raw: fields::SHUNT_VOLTAGE.unpack(reg.0 as u64) as i32,
            range,
        }
    }

    /// The sign extended 20 bit value
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.raw
    }

    /// ADC range of the measurement
    #[must_use]
    pub const fn range(self) -> AdcRange {
        self.range
    }

    /// Shunt voltage in pV, this is exact
    #[must_use]
    pub const fn shunt_voltage_pv(self) -> i64 {
        self.raw as i64 * self.range.shunt_lsb_pv()
    }

    /// Shunt voltage in nV, truncated towards zero
    #[must_use]
    pub const fn shunt_voltage_nv(self) -> i64 {
        self.shunt_voltage_pv() / 1_000
    }

    /// Shunt voltage in µV, truncated towards zero
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // ±163840µV at most
    pub const fn shunt_voltage_uv(self) -> i32 {
        (self.shunt_voltage_pv() / 1_000_000) as i32
    }

    /// Shunt voltage in µV
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn microvolts(self) -> f64 {
        self.shunt_voltage_pv() as f64 / 1e6
    }
}

/// A bus voltage measurement, the resolution is 195.3125µV
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct BusVoltage(u32);

impl BusVoltage {
    /// Decode the register
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 20 bits
    pub const fn from_register(reg: BusVoltageRegister) -> Self {
        Self(fields::BUS_VOLTAGE.extract(reg.0 as u64) as u32)
    }

    /// The 20 bit value
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Bus voltage in µV, truncated
    #[must_use]
    pub const fn voltage_uv(self) -> u32 {
        // 2^20 * 3125 still fits into a u32
        self.0 * 3_125 / 16
    }

    /// Bus voltage in mV, truncated
    #[must_use]
    pub const fn voltage_mv(self) -> u32 {
        self.voltage_uv() / 1_000
    }

    /// Bus voltage in nV, truncated
    #[must_use]
    pub const fn voltage_nv(self) -> u64 {
        self.0 as u64 * 3_125_000 / 16
    }

    /// Bus voltage in V
    #[must_use]
    pub fn volts(self) -> f64 {
        f64::from(self.0) * 195.3125e-6
    }
}

/// Die temperature, the resolution is 7.8125m°C
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DieTemperature(i16);

impl DieTemperature {
    /// Decode the register
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn from_register(reg: DieTemperatureRegister) -> Self {
        Self(fields::DIE_TEMPERATURE.unpack(reg.0 as u64) as i16)
    }

    /// The signed raw value
    #[must_use]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// Temperature in m°C, truncated towards zero
    #[must_use]
    pub const fn milli_celsius(self) -> i32 {
        self.0 as i32 * 125 / 16
    }

    /// Temperature in c°C, truncated towards zero
    #[must_use]
    pub const fn centi_celsius(self) -> i32 {
        self.0 as i32 * 25 / 32
    }

    /// Temperature in °C
    #[must_use]
    pub fn celsius(self) -> f64 {
        f64::from(self.0) * 7.8125e-3
    }
}

/// A current measurement, scaled by the current LSB of the calibration
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Current {
    raw: i32,
    context: CalibrationContext,
}

impl Current {
    /// Decode the register using the calibration that was active during the conversion
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 20 bits
    pub const fn from_register(reg: CurrentRegister, context: CalibrationContext) -> Self {
        Self {
            raw: fields::CURRENT.unpack(reg.0 as u64) as i32,
            context,
        }
    }

    /// The sign extended 20 bit value
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.raw
    }

    /// Current in nA
    #[must_use]
    pub const fn current_na(self) -> i64 {
        self.raw as i64 * self.context.current_lsb_na() as i64
    }

    /// Current in µA, truncated towards zero
    #[must_use]
    pub const fn current_ua(self) -> i64 {
        self.current_na() / 1_000
    }

    /// Current in A
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn amperes(self) -> f64 {
        self.current_na() as f64 * 1e-9
    }
}

/// A power measurement, the LSB is 3.2 times the current LSB
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Power {
    raw: u32,
    context: CalibrationContext,
}

impl Power {
    /// Decode the register using the calibration that was active during the conversion
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // 24 bits
    pub const fn from_register(reg: PowerRegister, context: CalibrationContext) -> Self {
        Self {
            raw: fields::POWER.extract(reg.0 as u64) as u32,
            context,
        }
    }

    /// The 24 bit value
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.raw
    }

    /// Power in pW, this is exact
    #[must_use]
    pub const fn power_pw(self) -> u128 {
        self.raw as u128 * self.context.power_lsb_pw() as u128
    }

    /// Power in nW, truncated
    #[must_use]
    pub const fn power_nw(self) -> u128 {
        self.power_pw() / 1_000
    }

    /// Power in µW, truncated
    #[must_use]
    pub const fn power_uw(self) -> u128 {
        self.power_pw() / 1_000_000
    }

    /// Power in W
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn watts(self) -> f64 {
        self.power_pw() as f64 * 1e-12
    }
}

/// Energy accumulated since the last reset of the accumulators
///
/// The LSB is 16 times the power LSB per conversion.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Energy {
    raw: u64,
    context: CalibrationContext,
}

impl Energy {
    /// Decode the register using the calibration that was active during accumulation
    #[must_use]
    pub const fn from_register(reg: EnergyRegister, context: CalibrationContext) -> Self {
        Self {
            raw: fields::ENERGY.extract(reg.0),
            context,
        }
    }

    /// The 40 bit value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.raw
    }

    /// Energy in pJ, this is exact
    #[must_use]
    pub const fn energy_pj(self) -> u128 {
        self.raw as u128 * self.context.energy_lsb_pj() as u128
    }

    /// Energy in µJ, truncated
    #[must_use]
    pub const fn energy_uj(self) -> u128 {
        self.energy_pj() / 1_000_000
    }

    /// Energy in J
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn joules(self) -> f64 {
        self.energy_pj() as f64 * 1e-12
    }
}

/// Charge accumulated since the last reset of the accumulators, can be negative
///
/// The LSB is the current LSB per conversion.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Charge {
    raw: i64,
    context: CalibrationContext,
}

impl Charge {
    /// Decode the register using the calibration that was active during accumulation
    #[must_use]
    pub const fn from_register(reg: ChargeRegister, context: CalibrationContext) -> Self {
        Self {
            raw: fields::CHARGE.unpack(reg.0),
            context,
        }
    }

    /// The sign extended 40 bit value
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Charge in nC, this is exact
    #[must_use]
    pub const fn charge_nc(self) -> i128 {
        self.raw as i128 * self.context.charge_lsb_nc() as i128
    }

    /// Charge in µC, truncated towards zero
    #[must_use]
    pub const fn charge_uc(self) -> i128 {
        self.charge_nc() / 1_000
    }

    /// Charge in C
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coulombs(self) -> f64 {
        self.charge_nc() as f64 * 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{Calibration, IntCalibration};
    use float_cmp::approx_eq;

    fn context(lsb_na: u32) -> CalibrationContext {
        CalibrationContext::new(lsb_na).unwrap()
    }

    #[test]
    fn shunt_voltage_depends_on_range() {
        let reg = ShuntVoltageRegister(0x00_0010);

        let fine = ShuntVoltage::from_register(reg, AdcRange::Fsr40mv96);
        let coarse = ShuntVoltage::from_register(reg, AdcRange::Fsr163mv84);
        assert_eq!(fine.raw(), 1);
        assert_eq!(fine.shunt_voltage_pv(), 78_125);
        assert_eq!(coarse.shunt_voltage_pv(), 312_500);
        assert_eq!(coarse.shunt_voltage_pv(), 4 * fine.shunt_voltage_pv());
        assert!(approx_eq!(f64, fine.microvolts(), 0.078_125, ulps = 2));
        assert!(approx_eq!(f64, coarse.microvolts(), 0.3125, ulps = 2));
    }

    #[test]
    fn shunt_voltage_full_scale() {
        let max = ShuntVoltageRegister(0x7F_FFF0);
        let min = ShuntVoltageRegister(0x80_0000);

        let v = ShuntVoltage::from_register(max, AdcRange::Fsr163mv84);
        assert_eq!(v.shunt_voltage_uv(), 163_839);
        let v = ShuntVoltage::from_register(min, AdcRange::Fsr163mv84);
        assert_eq!(v.shunt_voltage_uv(), -163_840);
        let v = ShuntVoltage::from_register(min, AdcRange::Fsr40mv96);
        assert_eq!(v.shunt_voltage_uv(), -40_960);

        // -1 LSB
        let v = ShuntVoltage::from_register(ShuntVoltageRegister(0xFF_FFF0), AdcRange::Fsr40mv96);
        assert_eq!(v.shunt_voltage_nv(), -78);
        assert_eq!(v.shunt_voltage_uv(), 0);
    }

    #[test]
    fn bus_voltage() {
        // 12V
        let v = BusVoltage::from_register(BusVoltageRegister(0x0F_0000));
        assert_eq!(v.raw(), 61_440);
        assert_eq!(v.voltage_mv(), 12_000);
        assert_eq!(v.voltage_uv(), 12_000_000);
        assert_eq!(v.voltage_nv(), 12_000_000_000);
        assert!(approx_eq!(f64, v.volts(), 12.0, epsilon = 1e-9));

        // Full scale is never negative
        let v = BusVoltage::from_register(BusVoltageRegister(0xFF_FFF0));
        assert_eq!(v.raw(), 0xF_FFFF);
        assert_eq!(v.voltage_uv(), 204_799_804);
    }

    #[test]
    fn die_temperature() {
        let targets = [
            (0x0C80, 25_000, 2_500),
            (0x0000, 0, 0),
            (0xEC00, -40_000, -4_000),
            (0x0001, 7, 0),
            (0xFFFF, -7, 0),
        ];
        for (raw, milli, centi) in targets {
            let t = DieTemperature::from_register(DieTemperatureRegister(raw));
            assert_eq!(t.milli_celsius(), milli, "{raw:#06x}");
            assert_eq!(t.centi_celsius(), centi, "{raw:#06x}");
        }
        let t = DieTemperature::from_register(DieTemperatureRegister(0x0C80));
        assert!(approx_eq!(f64, t.celsius(), 25.0, ulps = 2));
    }

    #[test]
    fn current_is_signed() {
        let ctx = context(1_000);
        let i = Current::from_register(CurrentRegister(0x00_0640), ctx);
        assert_eq!(i.raw(), 100);
        assert_eq!(i.current_ua(), 100);

        let i = Current::from_register(CurrentRegister(0xFF_F9C0), ctx);
        assert_eq!(i.raw(), -100);
        assert_eq!(i.current_na(), -100_000);
        assert!(approx_eq!(f64, i.amperes(), -1e-4, epsilon = 1e-12));
    }

    #[test]
    fn power_scales_with_current_lsb() {
        let p = Power::from_register(PowerRegister(1_000), context(1_000));
        assert_eq!(p.power_nw(), 3_200_000);
        assert_eq!(p.power_uw(), 3_200);

        let p = Power::from_register(PowerRegister(0xFF_FFFF), context(19_074));
        assert_eq!(p.power_pw(), 0xFF_FFFF * 3_200 * 19_074);
    }

    #[test]
    fn full_scale_power_at_largest_lsb() {
        let p = Power::from_register(PowerRegister(0xFF_FFFF), context(u32::MAX));
        assert_eq!(p.power_pw(), 0xFF_FFFF * 3_200 * u128::from(u32::MAX));
        assert_eq!(p.power_uw(), 0xFF_FFFF * 3_200 * u128::from(u32::MAX) / 1_000_000);

        // 500mA LSB over 1µOhm is still a valid calibration
        let calibration = IntCalibration::new(500_000_000, 1).unwrap();
        let p = Power::from_register(PowerRegister(0xFF_FFFF), calibration.context().unwrap());
        assert_eq!(p.power_uw(), 0xFF_FFFF * 1_600_000);
    }

    #[test]
    fn accumulators_start_at_zero() {
        let ctx = context(19_074);
        let e = Energy::from_register(EnergyRegister(0), ctx);
        let c = Charge::from_register(ChargeRegister(0), ctx);
        assert_eq!(e.raw(), 0);
        assert_eq!(e.energy_pj(), 0);
        assert_eq!(c.raw(), 0);
        assert_eq!(c.charge_nc(), 0);
    }

    #[test]
    fn accumulators_use_their_full_width() {
        let ctx = context(1_000);

        let e = Energy::from_register(EnergyRegister(0xFF_FFFF_FFFF), ctx);
        assert_eq!(e.raw(), 0xFF_FFFF_FFFF);
        assert_eq!(e.energy_uj(), 0xFF_FFFF_FFFF * 256 / 5);

        let c = Charge::from_register(ChargeRegister(0xFF_FFFF_FFFF), ctx);
        assert_eq!(c.raw(), -1);
        assert_eq!(c.charge_nc(), -1_000);
        assert_eq!(c.charge_uc(), -1);
        let c = Charge::from_register(ChargeRegister(0x80_0000_0000), ctx);
        assert_eq!(c.raw(), -(1 << 39));
    }

    #[test]
    fn raw_registers_are_masked_to_width() {
        assert_eq!(ShuntVoltageRegister::from_bits(0xFFFF_FFFF).0, 0xFF_FFFF);
        assert_eq!(DieTemperatureRegister::from_bits(0x1_0001).0, 1);
        assert_eq!(ChargeRegister::from_bits(u64::MAX).0, 0xFF_FFFF_FFFF);
    }
}
