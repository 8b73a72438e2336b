//! Types used to set the configuration for the INA228
//!
//! The INA228 splits its configuration over two registers: [`DeviceConfiguration`] (`CONFIG`)
//! holds the reset bits, the conversion delay, temperature compensation and the shunt range, while
//! [`AdcConfiguration`] (`ADC_CONFIG`) holds the operating mode, conversion times and averaging.
//! [`Configuration`] combines both.
//!
//! # Example
//! The `..` completion can be used to set specific values to change. For example:
//! ```rust
//! use ina228::configuration::{AdcConfiguration, Averaging, Configuration, ConversionTime};
//! let conf = Configuration {
//!     adc: AdcConfiguration {
//!         averaging: Averaging::Avg64,
//!         shunt_conversion_time: ConversionTime::Us4120,
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! assert_eq!(conf.as_bits(), (0x0000, 0xFBEB));
//! ```
//!
//! # Reset bits
//! `reset` and `reset_accumulators` are pulses: they are encoded when set, but the device clears
//! them on its own. Decoding always reports them as inactive, so for those two fields
//! `from_bits(as_bits(c)) == c` does not hold. All other fields round trip exactly.

use crate::field::Field;
use crate::register::{fields, ReadRegister, Register, RegisterName, WriteRegister};
use core::time::Duration;

/// Perform a system reset or continue work as normal
///
/// If set to `Reset` all registers are set to their defaults. The flag is cleared after the reset
/// was performed. So this should always read as `Run`.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Reset {
    /// Continue normal operation
    #[default]
    Run = 0,
    /// Perform system reset
    Reset = 1,
}

impl Reset {
    const FIELD: Field = fields::RESET;

    /// The bit self-clears, reading it back always yields `Run`
    #[must_use]
    const fn from_register(_reg: u16) -> Self {
        Self::Run
    }

    /// Set this value in `reg`, all other bits are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self as u8)
    }
}

/// Clear the ENERGY and CHARGE accumulators or keep accumulating
///
/// Just like [`Reset`] this reads back as `Keep` once the device handled it.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum AccumulatorReset {
    /// Keep accumulating
    #[default]
    Keep = 0,
    /// Set ENERGY and CHARGE to zero
    Clear = 1,
}

impl AccumulatorReset {
    const FIELD: Field = fields::RESET_ACCUMULATORS;

    #[must_use]
    const fn from_register(_reg: u16) -> Self {
        Self::Keep
    }

    /// Set this value in `reg`, all other bits are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self as u8)
    }
}

/// Delay between a write to `ADC_CONFIG` and the start of the first conversion
///
/// Set in steps of 2ms, from 0 up to 510ms.
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ConversionDelay(pub u8);

impl ConversionDelay {
    const FIELD: Field = fields::CONVERSION_DELAY;

    /// Delay rounded down to 2ms steps, `None` if longer than 510ms
    #[must_use]
    pub const fn from_ms(ms: u16) -> Option<Self> {
        let steps = ms / 2;
        if steps > u8::MAX as u16 {
            None
        } else {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(steps as u8))
        }
    }

    /// The delay in ms
    #[must_use]
    pub const fn as_ms(self) -> u16 {
        self.0 as u16 * 2
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    const fn from_register(reg: u16) -> Self {
        Self(Self::FIELD.unpack(reg as u64) as u8)
    }

    /// Set this value in `reg`, all other bits are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self.0)
    }
}

/// Shunt full scale range
///
/// The smaller range has four times the resolution but clips earlier.
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcRange {
    /// Range of ±163.84mV, 312.5nV per bit
    #[default]
    Fsr163mv84 = 0,
    /// Range of ±40.96mV, 78.125nV per bit
    Fsr40mv96 = 1,
}

impl AdcRange {
    const FIELD: Field = fields::ADC_RANGE;

    /// Full scale of the shunt voltage in nV
    #[must_use]
    pub const fn full_scale_nv(self) -> i64 {
        match self {
            AdcRange::Fsr163mv84 => 163_840_000,
            AdcRange::Fsr40mv96 => 40_960_000,
        }
    }

    /// Value of one bit of the shunt voltage register in pV
    #[must_use]
    pub const fn shunt_lsb_pv(self) -> i64 {
        match self {
            AdcRange::Fsr163mv84 => 312_500,
            AdcRange::Fsr40mv96 => 78_125,
        }
    }

    /// Factor the shunt calibration has to be multiplied with in this range
    #[must_use]
    pub const fn calibration_factor(self) -> u64 {
        match self {
            AdcRange::Fsr163mv84 => 1,
            AdcRange::Fsr40mv96 => 4,
        }
    }

    #[must_use]
    const fn from_register(reg: u16) -> Self {
        match Self::FIELD.extract(reg as u64) {
            0 => Self::Fsr163mv84,
            _ => Self::Fsr40mv96,
        }
    }

    /// Set this value in `reg`, all other bits are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self as u8)
    }
}

/// Operation mode of the INA228
///
/// The low three bits select which signals are converted (bus, shunt, temperature), the top bit
/// selects continuous operation. `0x0` and `0x8` both shut the ADC down.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum OperatingMode {
    /// Shut the ADC down
    Shutdown = 0x0,
    /// Single shot of the bus voltage
    TriggeredBus = 0x1,
    /// Single shot of the shunt voltage
    TriggeredShunt = 0x2,
    /// Single shot of shunt and bus voltage
    TriggeredShuntBus = 0x3,
    /// Single shot of the temperature
    TriggeredTemperature = 0x4,
    /// Single shot of temperature and bus voltage
    TriggeredTemperatureBus = 0x5,
    /// Single shot of temperature and shunt voltage
    TriggeredTemperatureShunt = 0x6,
    /// Single shot of all signals
    TriggeredAll = 0x7,
    /// Shut the ADC down, alternative encoding
    ShutdownContinuous = 0x8,
    /// Continuously convert the bus voltage
    ContinuousBus = 0x9,
    /// Continuously convert the shunt voltage
    ContinuousShunt = 0xA,
    /// Continuously convert shunt and bus voltage
    ContinuousShuntBus = 0xB,
    /// Continuously convert the temperature
    ContinuousTemperature = 0xC,
    /// Continuously convert temperature and bus voltage
    ContinuousTemperatureBus = 0xD,
    /// Continuously convert temperature and shunt voltage
    ContinuousTemperatureShunt = 0xE,
    /// Continuously convert all signals
    ContinuousAll = 0xF,
}

impl OperatingMode {
    const FIELD: Field = fields::MODE;

    const BUS: u8 = 0b0001;
    const SHUNT: u8 = 0b0010;
    const TEMPERATURE: u8 = 0b0100;
    const CONTINUOUS: u8 = 0b1000;

    /// Mode for the four bit code, the upper bits are ignored
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0xF {
            0x0 => Self::Shutdown,
            0x1 => Self::TriggeredBus,
            0x2 => Self::TriggeredShunt,
            0x3 => Self::TriggeredShuntBus,
            0x4 => Self::TriggeredTemperature,
            0x5 => Self::TriggeredTemperatureBus,
            0x6 => Self::TriggeredTemperatureShunt,
            0x7 => Self::TriggeredAll,
            0x8 => Self::ShutdownContinuous,
            0x9 => Self::ContinuousBus,
            0xA => Self::ContinuousShunt,
            0xB => Self::ContinuousShuntBus,
            0xC => Self::ContinuousTemperature,
            0xD => Self::ContinuousTemperatureBus,
            0xE => Self::ContinuousTemperatureShunt,
            0xF => Self::ContinuousAll,
            0x10..=u8::MAX => unreachable!(), // The mask removes all other bits
        }
    }

    /// Return the bits representing this mode
    #[must_use]
    pub const fn as_bits(self) -> u8 {
        self as u8
    }

    /// No signal is converted
    #[must_use]
    pub const fn is_shutdown(self) -> bool {
        self.as_bits() & !Self::CONTINUOUS == 0
    }

    /// Conversions repeat until the mode is changed
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        !self.is_shutdown() && self.as_bits() & Self::CONTINUOUS != 0
    }

    /// A single conversion is made every time `ADC_CONFIG` is written
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        !self.is_shutdown() && self.as_bits() & Self::CONTINUOUS == 0
    }

    /// The bus voltage is converted
    #[must_use]
    pub const fn measures_bus(self) -> bool {
        self.as_bits() & Self::BUS != 0
    }

    /// The shunt voltage is converted
    #[must_use]
    pub const fn measures_shunt(self) -> bool {
        self.as_bits() & Self::SHUNT != 0
    }

    /// The die temperature is converted
    #[must_use]
    pub const fn measures_temperature(self) -> bool {
        self.as_bits() & Self::TEMPERATURE != 0
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    const fn from_register(reg: u16) -> Self {
        Self::from_bits(Self::FIELD.extract(reg as u64) as u8)
    }

    /// Set this value in `reg`, all other bits are kept
    ///
    /// ```rust
    /// # use ina228::configuration::OperatingMode;
    /// assert_eq!(OperatingMode::TriggeredShuntBus.apply_to_reg(0xABCD), 0x3BCD);
    /// ```
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self.as_bits())
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        OperatingMode::ContinuousAll
    }
}

/// Conversion time of a single sample of bus voltage, shunt voltage or temperature
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum ConversionTime {
    /// 50µs
    Us50 = 0,
    /// 84µs
    Us84 = 1,
    /// 150µs
    Us150 = 2,
    /// 280µs
    Us280 = 3,
    /// 540µs
    Us540 = 4,
    /// 1052µs
    #[default]
    Us1052 = 5,
    /// 2074µs
    Us2074 = 6,
    /// 4120µs
    Us4120 = 7,
}

impl ConversionTime {
    /// Conversion time in µs
    ///
    /// Values according to the `ADC_CONFIG` register description in the datasheet.
    #[must_use]
    pub const fn as_us(self) -> u32 {
        match self {
            ConversionTime::Us50 => 50,
            ConversionTime::Us84 => 84,
            ConversionTime::Us150 => 150,
            ConversionTime::Us280 => 280,
            ConversionTime::Us540 => 540,
            ConversionTime::Us1052 => 1_052,
            ConversionTime::Us2074 => 2_074,
            ConversionTime::Us4120 => 4_120,
        }
    }

    #[must_use]
    const fn from_bits(bits: u64) -> Self {
        match bits & 0b111 {
            0 => Self::Us50,
            1 => Self::Us84,
            2 => Self::Us150,
            3 => Self::Us280,
            4 => Self::Us540,
            5 => Self::Us1052,
            6 => Self::Us2074,
            7 => Self::Us4120,
            8..=u64::MAX => unreachable!(), // The mask removes all other bits
        }
    }

    #[must_use]
    const fn from_register(field: Field, reg: u16) -> Self {
        Self::from_bits(field.extract(reg as u64))
    }

    #[must_use]
    const fn apply_to_reg(self, field: Field, reg: u16) -> u16 {
        apply(field, reg, self as u8)
    }
}

/// Number of samples averaged before the result registers are updated
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Averaging {
    /// No averaging
    #[default]
    Avg1 = 0,
    /// 4 samples
    Avg4 = 1,
    /// 16 samples
    Avg16 = 2,
    /// 64 samples
    Avg64 = 3,
    /// 128 samples
    Avg128 = 4,
    /// 256 samples
    Avg256 = 5,
    /// 512 samples
    Avg512 = 6,
    /// 1024 samples
    Avg1024 = 7,
}

impl Averaging {
    const FIELD: Field = fields::AVERAGING_COUNT;

    /// Number of samples that are averaged
    #[must_use]
    pub const fn count(self) -> u32 {
        match self {
            Averaging::Avg1 => 1,
            Averaging::Avg4 => 4,
            Averaging::Avg16 => 16,
            Averaging::Avg64 => 64,
            Averaging::Avg128 => 128,
            Averaging::Avg256 => 256,
            Averaging::Avg512 => 512,
            Averaging::Avg1024 => 1024,
        }
    }

    #[must_use]
    const fn from_register(reg: u16) -> Self {
        match Self::FIELD.extract(reg as u64) {
            0 => Self::Avg1,
            1 => Self::Avg4,
            2 => Self::Avg16,
            3 => Self::Avg64,
            4 => Self::Avg128,
            5 => Self::Avg256,
            6 => Self::Avg512,
            7 => Self::Avg1024,
            8..=u64::MAX => unreachable!(), // The field is only three bits wide
        }
    }

    /// Set this value in `reg`, all other bits are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        apply(Self::FIELD, reg, self as u8)
    }
}

// Every value handed in here comes from an enum or a field sized type, so truncation never kicks in.
#[allow(clippy::cast_possible_truncation)]
const fn apply(field: Field, reg: u16, value: u8) -> u16 {
    field.pack_truncating(reg as u64, value as i64) as u16
}

/// `CONFIG` register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DeviceConfiguration {
    /// Indicate to perform a reset or continue to run normally
    pub reset: Reset,
    /// Clear the energy and charge accumulators
    pub reset_accumulators: AccumulatorReset,
    /// Delay before the first conversion after `ADC_CONFIG` is written
    pub conversion_delay: ConversionDelay,
    /// Compensate the shunt resistance for the die temperature using `SHUNT_TEMPCO`
    pub temperature_compensation: bool,
    /// Full scale range of the shunt voltage
    pub adc_range: AdcRange,
}

impl DeviceConfiguration {
    /// Turn the bits of the `CONFIG` register into a `DeviceConfiguration`
    ///
    /// `reset` and `reset_accumulators` always decode as inactive.
    #[must_use]
    pub const fn from_bits(reg: u16) -> Self {
        Self {
            reset: Reset::from_register(reg),
            reset_accumulators: AccumulatorReset::from_register(reg),
            conversion_delay: ConversionDelay::from_register(reg),
            temperature_compensation: fields::TEMPERATURE_COMPENSATION.extract(reg as u64) != 0,
            adc_range: AdcRange::from_register(reg),
        }
    }

    /// Turn this `DeviceConfiguration` into the bits of the `CONFIG` register
    #[must_use]
    pub const fn as_bits(self) -> u16 {
        self.apply_to_reg(0)
    }

    /// Write all fields into `reg`, the reserved bits of `reg` are kept
    #[must_use]
    pub const fn apply_to_reg(self, reg: u16) -> u16 {
        let Self {
            reset,
            reset_accumulators,
            conversion_delay,
            temperature_compensation,
            adc_range,
        } = self;

        let mut bits = reg;
        bits = reset.apply_to_reg(bits);
        bits = reset_accumulators.apply_to_reg(bits);
        bits = conversion_delay.apply_to_reg(bits);
        bits = apply(
            fields::TEMPERATURE_COMPENSATION,
            bits,
            temperature_compensation as u8,
        );
        bits = adc_range.apply_to_reg(bits);
        bits
    }
}

/// `ADC_CONFIG` register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AdcConfiguration {
    /// Which signals to measure and if continuous or triggered operation is set up
    pub operating_mode: OperatingMode,
    /// Conversion time of the bus voltage
    pub bus_conversion_time: ConversionTime,
    /// Conversion time of the shunt voltage
    pub shunt_conversion_time: ConversionTime,
    /// Conversion time of the die temperature
    pub temperature_conversion_time: ConversionTime,
    /// Averaging applied to all signals
    pub averaging: Averaging,
}

impl AdcConfiguration {
    /// Turn the bits of the `ADC_CONFIG` register into an `AdcConfiguration`
    #[must_use]
    pub const fn from_bits(reg: u16) -> Self {
        Self {
            operating_mode: OperatingMode::from_register(reg),
            bus_conversion_time: ConversionTime::from_register(fields::BUS_CONVERSION_TIME, reg),
            shunt_conversion_time: ConversionTime::from_register(
                fields::SHUNT_CONVERSION_TIME,
                reg,
            ),
            temperature_conversion_time: ConversionTime::from_register(
                fields::TEMPERATURE_CONVERSION_TIME,
                reg,
            ),
            averaging: Averaging::from_register(reg),
        }
    }

    /// Turn this `AdcConfiguration` into the bits of the `ADC_CONFIG` register
    #[must_use]
    pub const fn as_bits(self) -> u16 {
        let Self {
            operating_mode,
            bus_conversion_time,
            shunt_conversion_time,
            temperature_conversion_time,
            averaging,
        } = self;

        let mut bits = 0;
        bits = operating_mode.apply_to_reg(bits);
        bits = bus_conversion_time.apply_to_reg(fields::BUS_CONVERSION_TIME, bits);
        bits = shunt_conversion_time.apply_to_reg(fields::SHUNT_CONVERSION_TIME, bits);
        bits = temperature_conversion_time.apply_to_reg(fields::TEMPERATURE_CONVERSION_TIME, bits);
        bits = averaging.apply_to_reg(bits);
        bits
    }

    /// Time in µs until all enabled signals are converted and averaged
    ///
    /// Returns `None` if the ADC is shut down.
    #[must_use]
    pub const fn conversion_time_us(self) -> Option<u32> {
        let mode = self.operating_mode;
        if mode.is_shutdown() {
            return None;
        }

        let mut single = 0;
        if mode.measures_bus() {
            single += self.bus_conversion_time.as_us();
        }
        if mode.measures_shunt() {
            single += self.shunt_conversion_time.as_us();
        }
        if mode.measures_temperature() {
            single += self.temperature_conversion_time.as_us();
        }

        Some(single * self.averaging.count())
    }
}

/// Complete configuration of the INA228, spread over `CONFIG` and `ADC_CONFIG`
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Configuration {
    /// Contents of the `CONFIG` register
    pub device: DeviceConfiguration,
    /// Contents of the `ADC_CONFIG` register
    pub adc: AdcConfiguration,
}

impl Configuration {
    /// Decode the `CONFIG` and `ADC_CONFIG` words
    #[must_use]
    pub const fn from_bits(config: u16, adc_config: u16) -> Self {
        Self {
            device: DeviceConfiguration::from_bits(config),
            adc: AdcConfiguration::from_bits(adc_config),
        }
    }

    /// Encode into the `CONFIG` and `ADC_CONFIG` words, in this order
    #[must_use]
    pub const fn as_bits(self) -> (u16, u16) {
        (self.device.as_bits(), self.adc.as_bits())
    }

    /// Time needed for one complete measurement including the initial delay
    ///
    /// Returns `None` if the ADC is shut down.
    #[must_use]
    pub fn conversion_time(&self) -> Option<Duration> {
        let adc_us = self.adc.conversion_time_us()?;
        let delay_us = u64::from(self.device.conversion_delay.as_ms()) * 1_000;
        Some(Duration::from_micros(u64::from(adc_us) + delay_us))
    }
}

impl Register for DeviceConfiguration {
    const NAME: RegisterName = RegisterName::Config;
}

impl ReadRegister for DeviceConfiguration {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self::from_bits(bits as u16)
    }
}

impl WriteRegister for DeviceConfiguration {
    fn as_bits(&self) -> u16 {
        (*self).as_bits()
    }
}

impl Register for AdcConfiguration {
    const NAME: RegisterName = RegisterName::AdcConfig;
}

impl ReadRegister for AdcConfiguration {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self::from_bits(bits as u16)
    }
}

impl WriteRegister for AdcConfiguration {
    fn as_bits(&self) -> u16 {
        (*self).as_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL_TIMES: [ConversionTime; 8] = [
        ConversionTime::Us50,
        ConversionTime::Us84,
        ConversionTime::Us150,
        ConversionTime::Us280,
        ConversionTime::Us540,
        ConversionTime::Us1052,
        ConversionTime::Us2074,
        ConversionTime::Us4120,
    ];

    #[test]
    fn default_matches_datasheet() {
        assert_eq!(Configuration::default().as_bits(), (0x0000, 0xFB68));
        assert_eq!(
            Configuration::from_bits(0x0000, 0xFB68),
            Configuration::default()
        );
    }

    #[test]
    fn every_mode_round_trips() {
        for code in 0..=0xF {
            let mode = OperatingMode::from_bits(code);
            assert_eq!(mode.as_bits(), code);

            let adc = AdcConfiguration {
                operating_mode: mode,
                ..Default::default()
            };
            assert_eq!(AdcConfiguration::from_bits(adc.as_bits()), adc);
        }
    }

    #[test]
    fn mode_only_touches_top_bits() {
        for code in 0..=0xF {
            let reg = OperatingMode::from_bits(code).apply_to_reg(0xABCD);
            assert_eq!(reg & 0x0FFF, 0x0BCD);
            assert_eq!(reg >> 12, u16::from(code));
        }
    }

    #[test]
    fn mode_properties() {
        assert!(OperatingMode::Shutdown.is_shutdown());
        assert!(OperatingMode::ShutdownContinuous.is_shutdown());
        assert!(!OperatingMode::ShutdownContinuous.is_continuous());
        assert!(OperatingMode::TriggeredAll.is_triggered());
        assert!(OperatingMode::ContinuousShuntBus.is_continuous());
        assert!(OperatingMode::ContinuousShuntBus.measures_bus());
        assert!(OperatingMode::ContinuousShuntBus.measures_shunt());
        assert!(!OperatingMode::ContinuousShuntBus.measures_temperature());
        assert!(OperatingMode::TriggeredTemperature.measures_temperature());
    }

    #[test]
    fn adc_config_is_inverse() {
        // Every bit of ADC_CONFIG belongs to a field, so all 2^16 patterns survive a round trip
        for val in 0..=u16::MAX {
            assert_eq!(AdcConfiguration::from_bits(val).as_bits(), val);
        }
    }

    #[test]
    fn device_config_is_inverse_except_resets() {
        // The reset bits are pulses and the lowest four bits are reserved
        let bits_to_ignore = 0b1100_0000_0000_1111;

        for val in 0..=u16::MAX {
            let config = DeviceConfiguration::from_bits(val);
            assert_eq!(config.reset, Reset::Run);
            assert_eq!(config.reset_accumulators, AccumulatorReset::Keep);
            assert_eq!(config.as_bits(), val & !bits_to_ignore);
        }
    }

    #[test]
    fn full_configuration_round_trips() {
        for (i, time) in ALL_TIMES.iter().copied().enumerate() {
            let conf = Configuration {
                device: DeviceConfiguration {
                    conversion_delay: ConversionDelay(u8::try_from(i * 31).unwrap()),
                    temperature_compensation: i % 2 == 0,
                    adc_range: if i % 3 == 0 {
                        AdcRange::Fsr40mv96
                    } else {
                        AdcRange::Fsr163mv84
                    },
                    ..Default::default()
                },
                adc: AdcConfiguration {
                    operating_mode: OperatingMode::from_bits(u8::try_from(i * 2).unwrap()),
                    bus_conversion_time: time,
                    shunt_conversion_time: ALL_TIMES[7 - i],
                    temperature_conversion_time: ALL_TIMES[(i + 3) % 8],
                    averaging: Averaging::from_register(u16::try_from(i).unwrap()),
                },
            };
            let (config, adc_config) = conf.as_bits();
            assert_eq!(Configuration::from_bits(config, adc_config), conf);
        }
    }

    #[test]
    fn reset_is_encoded_but_not_decoded() {
        let conf = DeviceConfiguration {
            reset: Reset::Reset,
            reset_accumulators: AccumulatorReset::Clear,
            ..Default::default()
        };
        assert_eq!(conf.as_bits(), 0xC000);
        assert_eq!(
            DeviceConfiguration::from_bits(0xC000),
            DeviceConfiguration::default()
        );
    }

    #[test]
    fn device_config_keeps_reserved_bits() {
        let conf = DeviceConfiguration {
            adc_range: AdcRange::Fsr40mv96,
            ..Default::default()
        };
        assert_eq!(conf.apply_to_reg(0b1111), 0b1_1111);
    }

    #[test]
    fn conversion_delay() {
        assert_eq!(ConversionDelay::from_ms(0), Some(ConversionDelay(0)));
        assert_eq!(ConversionDelay::from_ms(511), Some(ConversionDelay(255)));
        assert_eq!(ConversionDelay::from_ms(512), None);
        assert_eq!(ConversionDelay(255).as_ms(), 510);
        assert_eq!(
            DeviceConfiguration {
                conversion_delay: ConversionDelay(0xFF),
                ..Default::default()
            }
            .as_bits(),
            0b0011_1111_1100_0000
        );
    }

    #[test]
    fn conversion_time() {
        let conf = Configuration::default();
        // 3 signals of 1052µs each without averaging
        assert_eq!(conf.conversion_time(), Some(Duration::from_micros(3_156)));

        let conf = Configuration {
            device: DeviceConfiguration {
                conversion_delay: ConversionDelay(1),
                ..Default::default()
            },
            adc: AdcConfiguration {
                operating_mode: OperatingMode::TriggeredShunt,
                shunt_conversion_time: ConversionTime::Us50,
                averaging: Averaging::Avg16,
                ..Default::default()
            },
        };
        assert_eq!(
            conf.conversion_time(),
            Some(Duration::from_micros(2_000 + 16 * 50))
        );

        let conf = Configuration {
            adc: AdcConfiguration {
                operating_mode: OperatingMode::ShutdownContinuous,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(conf.conversion_time(), None);
    }
}
