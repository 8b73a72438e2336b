//! Register map of the INA228
//!
//! [`RegisterName`] lists every register with its address and transport width, and
//! [`RegisterName::fields`] gives the named sub-fields each register is made of. The typed register
//! structs of the other modules build on the same [`fields`] constants, so the layout is written
//! down exactly once.
#![allow(clippy::module_name_repetitions)]

use crate::field::Field;

/// Bit positions of every field the driver knows about
///
/// Values according to section 7.6 of the datasheet.
pub mod fields {
    use crate::field::Field;

    /// CONFIG: system reset, self clearing
    pub const RESET: Field = Field::unsigned(15, 1);
    /// CONFIG: clear ENERGY and CHARGE, self clearing
    pub const RESET_ACCUMULATORS: Field = Field::unsigned(14, 1);
    /// CONFIG: delay before the first conversion in steps of 2ms
    pub const CONVERSION_DELAY: Field = Field::unsigned(6, 8);
    /// CONFIG: shunt temperature compensation
    pub const TEMPERATURE_COMPENSATION: Field = Field::unsigned(5, 1);
    /// CONFIG: shunt full scale range
    pub const ADC_RANGE: Field = Field::unsigned(4, 1);

    /// `ADC_CONFIG`: operating mode
    pub const MODE: Field = Field::unsigned(12, 4);
    /// `ADC_CONFIG`: bus voltage conversion time
    pub const BUS_CONVERSION_TIME: Field = Field::unsigned(9, 3);
    /// `ADC_CONFIG`: shunt voltage conversion time
    pub const SHUNT_CONVERSION_TIME: Field = Field::unsigned(6, 3);
    /// `ADC_CONFIG`: temperature conversion time
    pub const TEMPERATURE_CONVERSION_TIME: Field = Field::unsigned(3, 3);
    /// `ADC_CONFIG`: averaging count
    pub const AVERAGING_COUNT: Field = Field::unsigned(0, 3);

    /// `SHUNT_CAL`
    pub const SHUNT_CALIBRATION: Field = Field::unsigned(0, 15);
    /// `SHUNT_TEMPCO` in ppm/°C
    pub const SHUNT_TEMPERATURE_COEFFICIENT: Field = Field::unsigned(0, 14);

    /// `VSHUNT`, the lowest four bits are reserved
    pub const SHUNT_VOLTAGE: Field = Field::signed(4, 20);
    /// `VBUS`, the lowest four bits are reserved
    pub const BUS_VOLTAGE: Field = Field::unsigned(4, 20);
    /// `DIETEMP`
    pub const DIE_TEMPERATURE: Field = Field::signed(0, 16);
    /// `CURRENT`, the lowest four bits are reserved
    pub const CURRENT: Field = Field::signed(4, 20);
    /// `POWER`
    pub const POWER: Field = Field::unsigned(0, 24);
    /// `ENERGY`
    pub const ENERGY: Field = Field::unsigned(0, 40);
    /// `CHARGE`
    pub const CHARGE: Field = Field::signed(0, 40);

    /// `DIAG_ALRT`: latch the alert pin until the register is read
    pub const ALERT_LATCH: Field = Field::unsigned(15, 1);
    /// `DIAG_ALRT`: drive the alert pin on conversion ready
    pub const CONVERSION_READY_ON_ALERT: Field = Field::unsigned(14, 1);
    /// `DIAG_ALRT`: compare the averaged value instead of every sample
    pub const ALERT_ON_AVERAGE: Field = Field::unsigned(13, 1);
    /// `DIAG_ALRT`: alert pin is active high
    pub const ALERT_POLARITY: Field = Field::unsigned(12, 1);
    /// `DIAG_ALRT`: ENERGY overflowed
    pub const ENERGY_OVERFLOW: Field = Field::unsigned(11, 1);
    /// `DIAG_ALRT`: CHARGE overflowed
    pub const CHARGE_OVERFLOW: Field = Field::unsigned(10, 1);
    /// `DIAG_ALRT`: arithmetic overflow in CURRENT or POWER
    pub const MATH_OVERFLOW: Field = Field::unsigned(9, 1);
    /// `DIAG_ALRT`: temperature above `TEMP_LIMIT`
    pub const TEMPERATURE_OVER_LIMIT: Field = Field::unsigned(7, 1);
    /// `DIAG_ALRT`: shunt voltage above `SOVL`
    pub const SHUNT_OVER_LIMIT: Field = Field::unsigned(6, 1);
    /// `DIAG_ALRT`: shunt voltage below `SUVL`
    pub const SHUNT_UNDER_LIMIT: Field = Field::unsigned(5, 1);
    /// `DIAG_ALRT`: bus voltage above `BOVL`
    pub const BUS_OVER_LIMIT: Field = Field::unsigned(4, 1);
    /// `DIAG_ALRT`: bus voltage below `BUVL`
    pub const BUS_UNDER_LIMIT: Field = Field::unsigned(3, 1);
    /// `DIAG_ALRT`: power above `PWR_LIMIT`
    pub const POWER_OVER_LIMIT: Field = Field::unsigned(2, 1);
    /// `DIAG_ALRT`: conversion finished
    pub const CONVERSION_COMPLETE: Field = Field::unsigned(1, 1);
    /// `DIAG_ALRT`: checksum error
    pub const CHECKSUM_ERROR: Field = Field::unsigned(0, 1);

    /// `SOVL` and `SUVL`, same resolution as the shunt voltage times 16
    pub const SHUNT_LIMIT: Field = Field::signed(0, 16);
    /// `BOVL` and `BUVL`, bit 15 is reserved
    pub const BUS_LIMIT: Field = Field::unsigned(0, 15);
    /// `TEMP_LIMIT`
    pub const TEMPERATURE_LIMIT: Field = Field::signed(0, 16);
    /// `PWR_LIMIT`
    pub const POWER_LIMIT: Field = Field::unsigned(0, 16);

    /// `MANUFACTURER_ID`
    pub const MANUFACTURER_ID: Field = Field::unsigned(0, 16);
    /// `DEVICE_ID`: die identifier
    pub const DIE_ID: Field = Field::unsigned(4, 12);
    /// `DEVICE_ID`: silicon revision
    pub const REVISION_ID: Field = Field::unsigned(0, 4);
}

/// Number of bits transferred when a register is accessed
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum RegisterWidth {
    /// Two bytes
    Bits16 = 16,
    /// Three bytes
    Bits24 = 24,
    /// Five bytes
    Bits40 = 40,
}

impl RegisterWidth {
    /// Number of bytes on the bus
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize / 8
    }

    /// Mask of all bits a register of this width can hold
    #[must_use]
    pub const fn mask(self) -> u64 {
        (1 << (self as u32)) - 1
    }
}

/// A field of a register together with its datasheet name
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct NamedField {
    /// Name of the field as used in the datasheet, lower case
    pub name: &'static str,
    /// Location of the field
    pub field: Field,
}

const fn named(name: &'static str, field: Field) -> NamedField {
    NamedField { name, field }
}

const CONFIG_FIELDS: &[NamedField] = &[
    named("rst", fields::RESET),
    named("rstacc", fields::RESET_ACCUMULATORS),
    named("convdly", fields::CONVERSION_DELAY),
    named("tempcomp", fields::TEMPERATURE_COMPENSATION),
    named("adcrange", fields::ADC_RANGE),
];

const ADC_CONFIG_FIELDS: &[NamedField] = &[
    named("mode", fields::MODE),
    named("vbusct", fields::BUS_CONVERSION_TIME),
    named("vshct", fields::SHUNT_CONVERSION_TIME),
    named("vtct", fields::TEMPERATURE_CONVERSION_TIME),
    named("avg", fields::AVERAGING_COUNT),
];

const DIAGNOSTIC_FIELDS: &[NamedField] = &[
    named("alatch", fields::ALERT_LATCH),
    named("cnvr", fields::CONVERSION_READY_ON_ALERT),
    named("slowalert", fields::ALERT_ON_AVERAGE),
    named("apol", fields::ALERT_POLARITY),
    named("energyof", fields::ENERGY_OVERFLOW),
    named("chargeof", fields::CHARGE_OVERFLOW),
    named("mathof", fields::MATH_OVERFLOW),
    named("tmpol", fields::TEMPERATURE_OVER_LIMIT),
    named("shntol", fields::SHUNT_OVER_LIMIT),
    named("shntul", fields::SHUNT_UNDER_LIMIT),
    named("busol", fields::BUS_OVER_LIMIT),
    named("busul", fields::BUS_UNDER_LIMIT),
    named("pol", fields::POWER_OVER_LIMIT),
    named("cnvrf", fields::CONVERSION_COMPLETE),
    named("checksum", fields::CHECKSUM_ERROR),
];

const SHUNT_CAL_FIELDS: &[NamedField] = &[named("shunt_cal", fields::SHUNT_CALIBRATION)];
const TEMPCO_FIELDS: &[NamedField] = &[named("tempco", fields::SHUNT_TEMPERATURE_COEFFICIENT)];
const SHUNT_VOLTAGE_FIELDS: &[NamedField] = &[named("vshunt", fields::SHUNT_VOLTAGE)];
const BUS_VOLTAGE_FIELDS: &[NamedField] = &[named("vbus", fields::BUS_VOLTAGE)];
const DIE_TEMPERATURE_FIELDS: &[NamedField] = &[named("dietemp", fields::DIE_TEMPERATURE)];
const CURRENT_FIELDS: &[NamedField] = &[named("current", fields::CURRENT)];
const POWER_FIELDS: &[NamedField] = &[named("power", fields::POWER)];
const ENERGY_FIELDS: &[NamedField] = &[named("energy", fields::ENERGY)];
const CHARGE_FIELDS: &[NamedField] = &[named("charge", fields::CHARGE)];
const SOVL_FIELDS: &[NamedField] = &[named("sovl", fields::SHUNT_LIMIT)];
const SUVL_FIELDS: &[NamedField] = &[named("suvl", fields::SHUNT_LIMIT)];
const BOVL_FIELDS: &[NamedField] = &[named("bovl", fields::BUS_LIMIT)];
const BUVL_FIELDS: &[NamedField] = &[named("buvl", fields::BUS_LIMIT)];
const TEMPERATURE_LIMIT_FIELDS: &[NamedField] = &[named("tol", fields::TEMPERATURE_LIMIT)];
const POWER_LIMIT_FIELDS: &[NamedField] = &[named("pol", fields::POWER_LIMIT)];
const MANUFACTURER_ID_FIELDS: &[NamedField] = &[named("manfid", fields::MANUFACTURER_ID)];

const DEVICE_ID_FIELDS: &[NamedField] = &[
    named("dieid", fields::DIE_ID),
    named("revid", fields::REVISION_ID),
];

/// Addresses of the internal registers of the INA228
///
/// See [`crate::SyncIna228::read_raw()`]
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum RegisterName {
    /// Configuration register, see [`crate::configuration::DeviceConfiguration`]
    Config = 0x00,
    /// ADC configuration register, see [`crate::configuration::AdcConfiguration`]
    AdcConfig = 0x01,
    /// Shunt calibration register, see [`crate::calibration::ShuntCalibration`]
    ShuntCalibration = 0x02,
    /// Shunt temperature coefficient register, see [`crate::calibration::TemperatureCoefficient`]
    ShuntTemperatureCoefficient = 0x03,
    /// Shunt voltage register, see [`crate::measurements::ShuntVoltage`]
    ShuntVoltage = 0x04,
    /// Bus voltage register, see [`crate::measurements::BusVoltage`]
    BusVoltage = 0x05,
    /// Die temperature register, see [`crate::measurements::DieTemperature`]
    DieTemperature = 0x06,
    /// Current register, see [`crate::measurements::Current`]
    Current = 0x07,
    /// Power register, see [`crate::measurements::Power`]
    Power = 0x08,
    /// Energy accumulator, see [`crate::measurements::Energy`]
    Energy = 0x09,
    /// Charge accumulator, see [`crate::measurements::Charge`]
    Charge = 0x0A,
    /// Diagnostic flags and alert configuration, see [`crate::diagnostics::DiagnosticFlags`]
    DiagnosticFlags = 0x0B,
    /// Shunt overvoltage threshold
    ShuntOvervoltageThreshold = 0x0C,
    /// Shunt undervoltage threshold
    ShuntUndervoltageThreshold = 0x0D,
    /// Bus overvoltage threshold
    BusOvervoltageThreshold = 0x0E,
    /// Bus undervoltage threshold
    BusUndervoltageThreshold = 0x0F,
    /// Temperature over-limit threshold
    TemperatureOverLimitThreshold = 0x10,
    /// Power over-limit threshold
    PowerOverLimitThreshold = 0x11,
    /// Manufacturer ID, reads 0x5449 ("TI")
    ManufacturerId = 0x3E,
    /// Device ID and revision
    DeviceId = 0x3F,
}

impl RegisterName {
    /// All registers in address order
    pub const ALL: [Self; 20] = [
        Self::Config,
        Self::AdcConfig,
        Self::ShuntCalibration,
        Self::ShuntTemperatureCoefficient,
        Self::ShuntVoltage,
        Self::BusVoltage,
        Self::DieTemperature,
        Self::Current,
        Self::Power,
        Self::Energy,
        Self::Charge,
        Self::DiagnosticFlags,
        Self::ShuntOvervoltageThreshold,
        Self::ShuntUndervoltageThreshold,
        Self::BusOvervoltageThreshold,
        Self::BusUndervoltageThreshold,
        Self::TemperatureOverLimitThreshold,
        Self::PowerOverLimitThreshold,
        Self::ManufacturerId,
        Self::DeviceId,
    ];

    /// Address of the register on the bus
    #[must_use]
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Look up the register at `address`
    #[must_use]
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|reg| reg.address() == address)
    }

    /// Number of bits transferred when accessing this register
    #[must_use]
    pub const fn width(self) -> RegisterWidth {
        match self {
            Self::ShuntVoltage | Self::BusVoltage | Self::Current | Self::Power => {
                RegisterWidth::Bits24
            }
            Self::Energy | Self::Charge => RegisterWidth::Bits40,
            _ => RegisterWidth::Bits16,
        }
    }

    /// Whether the register can be written
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(
            self,
            Self::Config
                | Self::AdcConfig
                | Self::ShuntCalibration
                | Self::ShuntTemperatureCoefficient
                | Self::DiagnosticFlags
                | Self::ShuntOvervoltageThreshold
                | Self::ShuntUndervoltageThreshold
                | Self::BusOvervoltageThreshold
                | Self::BusUndervoltageThreshold
                | Self::TemperatureOverLimitThreshold
                | Self::PowerOverLimitThreshold
        )
    }

    /// The fields this register is made of, most significant first
    ///
    /// Registers holding a single value return one field spanning the usable bits.
    #[must_use]
    pub const fn fields(self) -> &'static [NamedField] {
        match self {
            Self::Config => CONFIG_FIELDS,
            Self::AdcConfig => ADC_CONFIG_FIELDS,
            Self::ShuntCalibration => SHUNT_CAL_FIELDS,
            Self::ShuntTemperatureCoefficient => TEMPCO_FIELDS,
            Self::ShuntVoltage => SHUNT_VOLTAGE_FIELDS,
            Self::BusVoltage => BUS_VOLTAGE_FIELDS,
            Self::DieTemperature => DIE_TEMPERATURE_FIELDS,
            Self::Current => CURRENT_FIELDS,
            Self::Power => POWER_FIELDS,
            Self::Energy => ENERGY_FIELDS,
            Self::Charge => CHARGE_FIELDS,
            Self::DiagnosticFlags => DIAGNOSTIC_FIELDS,
            Self::ShuntOvervoltageThreshold => SOVL_FIELDS,
            Self::ShuntUndervoltageThreshold => SUVL_FIELDS,
            Self::BusOvervoltageThreshold => BOVL_FIELDS,
            Self::BusUndervoltageThreshold => BUVL_FIELDS,
            Self::TemperatureOverLimitThreshold => TEMPERATURE_LIMIT_FIELDS,
            Self::PowerOverLimitThreshold => POWER_LIMIT_FIELDS,
            Self::ManufacturerId => MANUFACTURER_ID_FIELDS,
            Self::DeviceId => DEVICE_ID_FIELDS,
        }
    }

    /// Look up a field of this register by its datasheet name
    #[must_use]
    pub fn field(self, name: &str) -> Option<Field> {
        self.fields()
            .iter()
            .find(|named| named.name == name)
            .map(|named| named.field)
    }
}

/// A typed view on one register
pub trait Register {
    const NAME: RegisterName;
    const ADDRESS: u8 = Self::NAME.address();
}

/// A register that can be turned into a typed value after reading it
pub trait ReadRegister: Register {
    /// Build the value from the register word, `bits` is at most as wide as the register
    fn from_bits(bits: u64) -> Self;
}

/// A register that can be written, all writable registers of the INA228 are 16 bits wide
pub trait WriteRegister: Register {
    fn as_bits(&self) -> u16;
}

/// Contents of the `MANUFACTURER_ID` register
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ManufacturerId(pub u16);

impl ManufacturerId {
    /// "TI" in ASCII
    pub const TEXAS_INSTRUMENTS: Self = Self(0x5449);
}

impl Register for ManufacturerId {
    const NAME: RegisterName = RegisterName::ManufacturerId;
}

impl ReadRegister for ManufacturerId {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self(fields::MANUFACTURER_ID.extract(bits) as u16)
    }
}

/// Contents of the `DEVICE_ID` register
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct DeviceId {
    /// 12 bit die identifier
    pub die: u16,
    /// Silicon revision
    pub revision: u8,
}

impl DeviceId {
    /// Die identifier of the INA228
    pub const INA228_DIE: u16 = 0x228;

    /// Whether this is an INA228 of any revision
    #[must_use]
    pub const fn is_ina228(self) -> bool {
        self.die == Self::INA228_DIE
    }
}

impl Register for DeviceId {
    const NAME: RegisterName = RegisterName::DeviceId;
}

impl ReadRegister for DeviceId {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self {
            die: fields::DIE_ID.extract(bits) as u16,
            revision: fields::REVISION_ID.extract(bits) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{ShuntCalibration, TemperatureCoefficient};
    use crate::configuration::{AdcConfiguration, DeviceConfiguration};
    use crate::diagnostics::DiagnosticFlags;
    use crate::measurements::{
        BusVoltageRegister, ChargeRegister, CurrentRegister, DieTemperatureRegister,
        EnergyRegister, PowerRegister, ShuntVoltageRegister,
    };

    #[test]
    fn register_names_match() {
        assert_eq!(RegisterName::Config as u8, DeviceConfiguration::ADDRESS);
        assert_eq!(RegisterName::AdcConfig as u8, AdcConfiguration::ADDRESS);
        assert_eq!(
            RegisterName::ShuntCalibration as u8,
            ShuntCalibration::ADDRESS
        );
        assert_eq!(
            RegisterName::ShuntTemperatureCoefficient as u8,
            TemperatureCoefficient::ADDRESS
        );
        assert_eq!(
            RegisterName::ShuntVoltage as u8,
            ShuntVoltageRegister::ADDRESS
        );
        assert_eq!(RegisterName::BusVoltage as u8, BusVoltageRegister::ADDRESS);
        assert_eq!(
            RegisterName::DieTemperature as u8,
            DieTemperatureRegister::ADDRESS
        );
        assert_eq!(RegisterName::Current as u8, CurrentRegister::ADDRESS);
        assert_eq!(RegisterName::Power as u8, PowerRegister::ADDRESS);
        assert_eq!(RegisterName::Energy as u8, EnergyRegister::ADDRESS);
        assert_eq!(RegisterName::Charge as u8, ChargeRegister::ADDRESS);
        assert_eq!(RegisterName::DiagnosticFlags as u8, DiagnosticFlags::ADDRESS);
    }

    #[test]
    fn addresses_are_unique() {
        for (i, a) in RegisterName::ALL.iter().enumerate() {
            for b in &RegisterName::ALL[i + 1..] {
                assert_ne!(a.address(), b.address());
            }
            assert_eq!(RegisterName::from_address(a.address()), Some(*a));
        }
        assert_eq!(RegisterName::from_address(0x12), None);
    }

    #[test]
    fn fields_do_not_overlap_and_fit() {
        for reg in RegisterName::ALL {
            let mut seen = 0u64;
            for named in reg.fields() {
                let mask = named.field.mask();
                assert_eq!(seen & mask, 0, "{reg:?}.{} overlaps", named.name);
                assert_eq!(
                    mask & !reg.width().mask(),
                    0,
                    "{reg:?}.{} does not fit",
                    named.name
                );
                seen |= mask;
            }
        }
    }

    #[test]
    fn fields_are_ordered_msb_first() {
        for reg in RegisterName::ALL {
            let offsets: Vec<u8> = reg.fields().iter().map(|f| f.field.offset()).collect();
            let mut sorted = offsets.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(offsets, sorted, "{reg:?}");
        }
    }

    #[test]
    fn datasheet_widths() {
        use RegisterWidth::{Bits16, Bits24, Bits40};

        let expected = [
            (RegisterName::Config, Bits16),
            (RegisterName::ShuntVoltage, Bits24),
            (RegisterName::BusVoltage, Bits24),
            (RegisterName::DieTemperature, Bits16),
            (RegisterName::Current, Bits24),
            (RegisterName::Power, Bits24),
            (RegisterName::Energy, Bits40),
            (RegisterName::Charge, Bits40),
            (RegisterName::DiagnosticFlags, Bits16),
            (RegisterName::PowerOverLimitThreshold, Bits16),
            (RegisterName::DeviceId, Bits16),
        ];
        for (reg, width) in expected {
            assert_eq!(reg.width(), width, "{reg:?}");
        }
        assert_eq!(Bits40.bytes(), 5);
    }

    #[test]
    fn field_lookup() {
        assert_eq!(RegisterName::AdcConfig.field("mode"), Some(fields::MODE));
        assert_eq!(
            RegisterName::Config.field("adcrange"),
            Some(fields::ADC_RANGE)
        );
        assert_eq!(RegisterName::Config.field("mode"), None);
        assert_eq!(fields::MODE.mask(), 0xF000);
        assert_eq!(fields::CONVERSION_DELAY.mask(), 0b0011_1111_1100_0000);
    }

    #[test]
    fn device_id_split() {
        let id = DeviceId::from_bits(0x2281);
        assert_eq!(id.die, 0x228);
        assert_eq!(id.revision, 1);
        assert!(id.is_ina228());
        assert!(!DeviceId::from_bits(0x2260).is_ina228());
        assert_eq!(
            ManufacturerId::from_bits(0x5449),
            ManufacturerId::TEXAS_INSTRUMENTS
        );
    }

    #[test]
    fn identification_is_read_only() {
        assert!(!RegisterName::ManufacturerId.is_writable());
        assert!(!RegisterName::Energy.is_writable());
        assert!(RegisterName::DiagnosticFlags.is_writable());
    }
}
