//! Types and trait to calibrate the INA228
//!
//! The INA228 computes current, power, energy and charge on its own, using the value of the
//! `SHUNT_CAL` register. Decoding those registers needs the current LSB the calibration value was
//! derived from, this is what [`CalibrationContext`] carries. Without a context the driver refuses
//! to decode them, see [`MeasurementError::NotCalibrated`](crate::errors::MeasurementError).

use crate::configuration::AdcRange;
use crate::errors::CodecRangeError;
use crate::register::{fields, ReadRegister, Register, RegisterName, WriteRegister};

/// Contents of the `SHUNT_CAL` register, 15 bits
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ShuntCalibration(u16);

impl ShuntCalibration {
    /// Wrap a raw calibration value
    ///
    /// # Errors
    /// Returns an error if `bits` does not fit into 15 bits.
    pub const fn new(bits: u16) -> Result<Self, CodecRangeError> {
        match fields::SHUNT_CALIBRATION.pack(0, bits as i64) {
            #[allow(clippy::cast_possible_truncation)]
            Ok(word) => Ok(Self(word as u16)),
            Err(e) => Err(e),
        }
    }

    /// The raw register value
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl Register for ShuntCalibration {
    const NAME: RegisterName = RegisterName::ShuntCalibration;
}

impl ReadRegister for ShuntCalibration {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self(fields::SHUNT_CALIBRATION.extract(bits) as u16)
    }
}

impl WriteRegister for ShuntCalibration {
    fn as_bits(&self) -> u16 {
        self.0
    }
}

/// Contents of the `SHUNT_TEMPCO` register, temperature coefficient of the shunt in ppm/°C
///
/// Only used if [`temperature_compensation`] is enabled.
///
/// [`temperature_compensation`]: crate::configuration::DeviceConfiguration::temperature_compensation
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct TemperatureCoefficient(u16);

impl TemperatureCoefficient {
    /// Coefficient in ppm/°C
    ///
    /// # Errors
    /// Returns an error if `ppm` does not fit into 14 bits (0..=16383).
    pub const fn new(ppm: u16) -> Result<Self, CodecRangeError> {
        match fields::SHUNT_TEMPERATURE_COEFFICIENT.pack(0, ppm as i64) {
            #[allow(clippy::cast_possible_truncation)]
            Ok(word) => Ok(Self(word as u16)),
            Err(e) => Err(e),
        }
    }

    /// Coefficient in ppm/°C
    #[must_use]
    pub const fn ppm_per_celsius(self) -> u16 {
        self.0
    }
}

impl Register for TemperatureCoefficient {
    const NAME: RegisterName = RegisterName::ShuntTemperatureCoefficient;
}

impl ReadRegister for TemperatureCoefficient {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self(fields::SHUNT_TEMPERATURE_COEFFICIENT.extract(bits) as u16)
    }
}

impl WriteRegister for TemperatureCoefficient {
    fn as_bits(&self) -> u16 {
        self.0
    }
}

/// Scale factors needed to turn current, power, energy and charge registers into physical units
///
/// Power LSB = 3.2 × current LSB, energy LSB = 16 × power LSB, charge LSB = current LSB.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct CalibrationContext {
    current_lsb_na: u32,
}

impl CalibrationContext {
    /// Context for the given current LSB in nA, `None` for a LSB of zero
    #[must_use]
    pub const fn new(current_lsb_na: u32) -> Option<Self> {
        if current_lsb_na == 0 {
            None
        } else {
            Some(Self { current_lsb_na })
        }
    }

    /// Value of the least significant bit of the current register in nA
    #[must_use]
    pub const fn current_lsb_na(self) -> u32 {
        self.current_lsb_na
    }

    /// Value of the least significant bit of the power register in pW
    #[must_use]
    pub const fn power_lsb_pw(self) -> u64 {
        3_200 * self.current_lsb_na as u64
    }

    /// Value of the least significant bit of the energy register in pJ
    #[must_use]
    pub const fn energy_lsb_pj(self) -> u64 {
        16 * self.power_lsb_pw()
    }

    /// Value of the least significant bit of the charge register in nC
    #[must_use]
    pub const fn charge_lsb_nc(self) -> u32 {
        self.current_lsb_na
    }
}

/// Trait describing a calibration for the INA228
pub trait Calibration {
    /// Value for the `SHUNT_CAL` register when the shunt is measured in `range`
    fn shunt_calibration(&self, range: AdcRange) -> ShuntCalibration;

    /// Value for the `SHUNT_TEMPCO` register
    fn temperature_coefficient(&self) -> TemperatureCoefficient {
        TemperatureCoefficient::default()
    }

    /// Scale factors for the calculated registers, `None` if they can not be decoded
    fn context(&self) -> Option<CalibrationContext>;
}

impl<T: Calibration> Calibration for Option<T> {
    fn shunt_calibration(&self, range: AdcRange) -> ShuntCalibration {
        match self {
            None => ShuntCalibration::default(),
            Some(cal) => cal.shunt_calibration(range),
        }
    }

    fn temperature_coefficient(&self) -> TemperatureCoefficient {
        self.as_ref()
            .map(Calibration::temperature_coefficient)
            .unwrap_or_default()
    }

    fn context(&self) -> Option<CalibrationContext> {
        self.as_ref().and_then(Calibration::context)
    }
}

/// Empty calibration that does not perform any calibration
///
/// Use this if you don't want to use the current, power, energy or charge measurements of the
/// INA228.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct UnCalibrated;

impl Calibration for UnCalibrated {
    fn shunt_calibration(&self, _range: AdcRange) -> ShuntCalibration {
        ShuntCalibration::default()
    }

    fn context(&self) -> Option<CalibrationContext> {
        None
    }
}

/// Scaling factor derived from the datasheet and the n and µ SI prefixes: 13107.2e6 · 1e-9 · 1e-6
/// expressed as a fraction
const SCALING_NUMERATOR: u128 = 131_072;
const SCALING_DENOMINATOR: u128 = 10_000_000_000;

/// Largest current LSB is `max current / 2^19`
const CURRENT_STEPS: u64 = 1 << 19;

/// Calibration computed from the current LSB and the shunt resistance using integer math
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[allow(clippy::module_name_repetitions)] // Just Int is a bit to short
pub struct IntCalibration {
    context: CalibrationContext,

    /// Resistance of the shunt resistor in µOhm
    r_shunt_uohm: u32,

    temperature_coefficient: TemperatureCoefficient,
}

impl IntCalibration {
    /// Create a new calibration using the least significant bit (LSB) of the current register in nA
    /// and the value of the shunt resistor used in µOhm
    ///
    /// Returns `None` if the resulting `SHUNT_CAL` would be zero or would not fit into 15 bits in
    /// either of the two ADC ranges.
    #[must_use]
    pub const fn new(current_lsb_na: u32, r_shunt_uohm: u32) -> Option<Self> {
        let Some(context) = CalibrationContext::new(current_lsb_na) else {
            return None;
        };
        let cal = Self {
            context,
            r_shunt_uohm,
            temperature_coefficient: TemperatureCoefficient(0),
        };

        let coarse = cal.raw_calibration(AdcRange::Fsr163mv84);
        let fine = cal.raw_calibration(AdcRange::Fsr40mv96);
        if coarse == 0 || fine > fields::SHUNT_CALIBRATION.max() as u128 {
            return None;
        }

        Some(cal)
    }

    /// Create a calibration for the largest current that has to be measured in µA
    ///
    /// The current LSB is chosen as `max_current / 2^19` rounded up to the next nA.
    #[must_use]
    pub const fn from_max_current(max_current_ua: u64, r_shunt_uohm: u32) -> Option<Self> {
        let lsb = (max_current_ua * 1_000).div_ceil(CURRENT_STEPS);
        if lsb > u32::MAX as u64 {
            return None;
        }

        #[allow(clippy::cast_possible_truncation)]
        Self::new(lsb as u32, r_shunt_uohm)
    }

    /// Use `coefficient` to compensate for the temperature drift of the shunt
    #[must_use]
    pub const fn with_temperature_coefficient(mut self, coefficient: TemperatureCoefficient) -> Self {
        self.temperature_coefficient = coefficient;
        self
    }

    const fn raw_calibration(self, range: AdcRange) -> u128 {
        let product = self.context.current_lsb_na() as u128
            * self.r_shunt_uohm as u128
            * SCALING_NUMERATOR
            * range.calibration_factor() as u128;
        product / SCALING_DENOMINATOR
    }

    /// Turn this calibration into the bits that can be written to the calibration register
    #[must_use]
    pub const fn as_bits(self, range: AdcRange) -> u16 {
        let cal = self.raw_calibration(range);

        // try_from is not const and we do the check manually
        #[allow(clippy::cast_possible_truncation)]
        if cal <= fields::SHUNT_CALIBRATION.max() as u128 {
            cal as u16
        } else {
            // This should be enforced by new
            unreachable!()
        }
    }

    /// The value of the least significant bit in the current register in nA
    #[must_use]
    pub const fn current_lsb_na(self) -> u32 {
        self.context.current_lsb_na()
    }

    /// The value of the shunt used in µOhm
    #[must_use]
    pub const fn r_shunt_uohm(self) -> u32 {
        self.r_shunt_uohm
    }
}

impl Calibration for IntCalibration {
    fn shunt_calibration(&self, range: AdcRange) -> ShuntCalibration {
        ShuntCalibration(self.as_bits(range))
    }

    fn temperature_coefficient(&self) -> TemperatureCoefficient {
        self.temperature_coefficient
    }

    fn context(&self) -> Option<CalibrationContext> {
        Some(self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)] // This is only used in tests
    fn as_bits_datasheet(cal: IntCalibration, range: AdcRange) -> u16 {
        // SHUNT_CAL = 13107.2 × 10^6 × CURRENT_LSB × R_SHUNT, times 4 in the 40.96mV range
        // with CURRENT_LSB in nA and R_SHUNT in µOhm all factors are integers up to the 10^-10
        let scaled = 131_072.0
            * f64::from(cal.current_lsb_na())
            * f64::from(cal.r_shunt_uohm())
            * range.calibration_factor() as f64;
        let value = f64::trunc(scaled / 1e10);
        assert!(
            (0.0..=32_767.0).contains(&value),
            "Calculation out of range"
        );

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            value as u16
        }
    }

    #[test]
    fn calculation_fits_datasheet() {
        for i in (1..=100_000).step_by(997) {
            for r in (1..=100_000).step_by(313) {
                if let Some(cal) = IntCalibration::new(i, r) {
                    for range in [AdcRange::Fsr163mv84, AdcRange::Fsr40mv96] {
                        assert_eq!(as_bits_datasheet(cal, range), cal.as_bits(range));
                    }
                }
            }
        }
    }

    #[test]
    fn datasheet_example() {
        // 10A maximum over a 10mOhm shunt
        let cal = IntCalibration::from_max_current(10_000_000, 10_000).unwrap();
        assert_eq!(cal.current_lsb_na(), 19_074);
        assert_eq!(cal.as_bits(AdcRange::Fsr163mv84), 2_500);
        assert_eq!(cal.as_bits(AdcRange::Fsr40mv96), 10_000);
    }

    #[test]
    fn rejects_unusable_calibrations() {
        assert!(IntCalibration::new(0, 10_000).is_none());
        // SHUNT_CAL would be zero
        assert!(IntCalibration::new(1, 1).is_none());
        // Fits the coarse range but overflows 15 bits in the fine range
        assert!(IntCalibration::new(100_000, 20_000).is_none());
    }

    #[test]
    fn derived_lsbs() {
        let ctx = CalibrationContext::new(1_000).unwrap();
        assert_eq!(ctx.power_lsb_pw(), 3_200_000);
        assert_eq!(ctx.energy_lsb_pj(), 51_200_000);
        assert_eq!(ctx.charge_lsb_nc(), 1_000);
        assert!(CalibrationContext::new(0).is_none());
    }

    #[test]
    fn register_limits() {
        assert!(ShuntCalibration::new(0x7FFF).is_ok());
        assert!(ShuntCalibration::new(0x8000).is_err());
        assert!(TemperatureCoefficient::new(0x3FFF).is_ok());
        assert!(TemperatureCoefficient::new(0x4000).is_err());
        assert_eq!(ShuntCalibration::from_bits(0xFFFF).bits(), 0x7FFF);
    }

    #[test]
    fn uncalibrated_has_no_context() {
        assert!(UnCalibrated.context().is_none());
        assert_eq!(
            UnCalibrated.shunt_calibration(AdcRange::Fsr40mv96).bits(),
            0
        );
        assert!(None::<IntCalibration>.context().is_none());

        let cal = IntCalibration::new(1_000, 10_000)
            .unwrap()
            .with_temperature_coefficient(TemperatureCoefficient::new(20).unwrap());
        assert_eq!(Some(cal).context(), cal.context());
        assert_eq!(Some(cal).temperature_coefficient().ppm_per_celsius(), 20);
    }
}
