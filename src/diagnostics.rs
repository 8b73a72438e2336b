//! Diagnostic flags and alert configuration
//!
//! The `DIAG_ALRT` register mixes four configuration bits, which are written by the user, with
//! status flags that are set and cleared by the device. [`DiagnosticFlags`] is the decoded view on
//! the whole register, [`AlertConfiguration`] is the only part that is ever written back.

use crate::register::{fields, ReadRegister, Register, RegisterName, WriteRegister};
use bitflags::bitflags;

/// Bit of the register for a single bit field
const fn bit(field: crate::field::Field) -> u16 {
    1 << field.offset()
}

bitflags! {
    /// Contents of the diagnostic and alert register
    ///
    /// Every flag is a direct test of its bit, no flag implies another.
    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct DiagnosticFlags: u16 {
        /// Alert pin stays asserted until the register is read
        const ALERT_LATCH = bit(fields::ALERT_LATCH);
        /// Alert pin is asserted when a conversion finished
        const CONVERSION_READY_ON_ALERT = bit(fields::CONVERSION_READY_ON_ALERT);
        /// Limits are compared against the averaged value
        const ALERT_ON_AVERAGE = bit(fields::ALERT_ON_AVERAGE);
        /// Alert pin is active high
        const ALERT_POLARITY = bit(fields::ALERT_POLARITY);
        /// The energy accumulator overflowed
        const ENERGY_OVERFLOW = bit(fields::ENERGY_OVERFLOW);
        /// The charge accumulator overflowed
        const CHARGE_OVERFLOW = bit(fields::CHARGE_OVERFLOW);
        /// Current or power calculation overflowed, their values are not valid
        const MATH_OVERFLOW = bit(fields::MATH_OVERFLOW);
        /// Die temperature over `TEMP_LIMIT`
        const TEMPERATURE_OVER_LIMIT = bit(fields::TEMPERATURE_OVER_LIMIT);
        /// Shunt voltage over `SOVL`
        const SHUNT_OVER_LIMIT = bit(fields::SHUNT_OVER_LIMIT);
        /// Shunt voltage under `SUVL`
        const SHUNT_UNDER_LIMIT = bit(fields::SHUNT_UNDER_LIMIT);
        /// Bus voltage over `BOVL`
        const BUS_OVER_LIMIT = bit(fields::BUS_OVER_LIMIT);
        /// Bus voltage under `BUVL`
        const BUS_UNDER_LIMIT = bit(fields::BUS_UNDER_LIMIT);
        /// Power over `PWR_LIMIT`
        const POWER_OVER_LIMIT = bit(fields::POWER_OVER_LIMIT);
        /// A conversion finished, cleared by reading this register
        const CONVERSION_COMPLETE = bit(fields::CONVERSION_COMPLETE);
        /// Checksum error
        const CHECKSUM_ERROR = bit(fields::CHECKSUM_ERROR);

        /// All bits that can be written
        const ALERT_CONFIGURATION = Self::ALERT_LATCH.bits()
            | Self::CONVERSION_READY_ON_ALERT.bits()
            | Self::ALERT_ON_AVERAGE.bits()
            | Self::ALERT_POLARITY.bits();
        /// All bits that are managed by the device
        const STATUS = Self::ENERGY_OVERFLOW.bits()
            | Self::CHARGE_OVERFLOW.bits()
            | Self::MATH_OVERFLOW.bits()
            | Self::TEMPERATURE_OVER_LIMIT.bits()
            | Self::SHUNT_OVER_LIMIT.bits()
            | Self::SHUNT_UNDER_LIMIT.bits()
            | Self::BUS_OVER_LIMIT.bits()
            | Self::BUS_UNDER_LIMIT.bits()
            | Self::POWER_OVER_LIMIT.bits()
            | Self::CONVERSION_COMPLETE.bits()
            | Self::CHECKSUM_ERROR.bits();
    }
}

impl DiagnosticFlags {
    /// Only the flags set by the device
    #[must_use]
    pub const fn status(self) -> Self {
        self.intersection(Self::STATUS)
    }

    /// Whether any of the limit comparisons fired
    #[must_use]
    pub const fn any_limit_exceeded(self) -> bool {
        self.intersects(
            Self::TEMPERATURE_OVER_LIMIT
                .union(Self::SHUNT_OVER_LIMIT)
                .union(Self::SHUNT_UNDER_LIMIT)
                .union(Self::BUS_OVER_LIMIT)
                .union(Self::BUS_UNDER_LIMIT)
                .union(Self::POWER_OVER_LIMIT),
        )
    }
}

#[cfg(feature = "defmt-03")]
impl defmt::Format for DiagnosticFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "DiagnosticFlags({=u16:#x})", self.bits());
    }
}

impl Register for DiagnosticFlags {
    const NAME: RegisterName = RegisterName::DiagnosticFlags;
}

impl ReadRegister for DiagnosticFlags {
    #[allow(clippy::cast_possible_truncation)]
    fn from_bits(bits: u64) -> Self {
        Self::from_bits_truncate(bits as u16)
    }
}

/// Active level of the alert pin
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum AlertPolarity {
    /// Open drain, pulled low on alert
    #[default]
    ActiveLow = 0,
    /// Inverted, high on alert
    ActiveHigh = 1,
}

/// The writable part of the diagnostic and alert register
///
/// ```rust
/// use ina228::diagnostics::{AlertConfiguration, AlertPolarity};
/// use ina228::register::WriteRegister;
///
/// let conf = AlertConfiguration {
///     latch: true,
///     polarity: AlertPolarity::ActiveHigh,
///     ..AlertConfiguration::default()
/// };
/// assert_eq!(conf.as_bits(), 0x9000);
/// ```
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct AlertConfiguration {
    /// Keep the alert pin asserted until the register is read
    pub latch: bool,
    /// Assert the alert pin when a conversion finished
    pub conversion_ready_on_alert: bool,
    /// Compare the limits against the averaged value instead of every sample
    pub alert_on_average: bool,
    /// Level of the alert pin when asserted
    pub polarity: AlertPolarity,
}

impl AlertConfiguration {
    /// Configuration encoded as flags, status flags are never set
    #[must_use]
    pub const fn as_flags(self) -> DiagnosticFlags {
        let mut flags = DiagnosticFlags::empty();
        if self.latch {
            flags = flags.union(DiagnosticFlags::ALERT_LATCH);
        }
        if self.conversion_ready_on_alert {
            flags = flags.union(DiagnosticFlags::CONVERSION_READY_ON_ALERT);
        }
        if self.alert_on_average {
            flags = flags.union(DiagnosticFlags::ALERT_ON_AVERAGE);
        }
        if matches!(self.polarity, AlertPolarity::ActiveHigh) {
            flags = flags.union(DiagnosticFlags::ALERT_POLARITY);
        }
        flags
    }
}

impl From<DiagnosticFlags> for AlertConfiguration {
    fn from(flags: DiagnosticFlags) -> Self {
        Self {
            latch: flags.contains(DiagnosticFlags::ALERT_LATCH),
            conversion_ready_on_alert: flags.contains(DiagnosticFlags::CONVERSION_READY_ON_ALERT),
            alert_on_average: flags.contains(DiagnosticFlags::ALERT_ON_AVERAGE),
            polarity: if flags.contains(DiagnosticFlags::ALERT_POLARITY) {
                AlertPolarity::ActiveHigh
            } else {
                AlertPolarity::ActiveLow
            },
        }
    }
}

impl Register for AlertConfiguration {
    const NAME: RegisterName = RegisterName::DiagnosticFlags;
}

impl WriteRegister for AlertConfiguration {
    fn as_bits(&self) -> u16 {
        self.as_flags()
            .intersection(DiagnosticFlags::ALERT_CONFIGURATION)
            .bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(raw: u64) -> DiagnosticFlags {
        <DiagnosticFlags as ReadRegister>::from_bits(raw)
    }

    #[test]
    fn conversion_complete_only() {
        let flags = decode(0x0002);
        assert_eq!(flags, DiagnosticFlags::CONVERSION_COMPLETE);
        assert!(!flags.contains(DiagnosticFlags::CHECKSUM_ERROR));
        assert!(!flags.contains(DiagnosticFlags::MATH_OVERFLOW));
        assert!(!flags.any_limit_exceeded());
    }

    #[test]
    fn every_flag_is_its_own_bit() {
        for (name, flag) in DiagnosticFlags::all().iter_names() {
            let field = RegisterName::DiagnosticFlags
                .fields()
                .iter()
                .find(|named| 1 << named.field.offset() == flag.bits())
                .unwrap_or_else(|| panic!("{name} has no field"));
            assert_eq!(field.field.width(), 1, "{name}");
        }
        assert_eq!(DiagnosticFlags::all().bits(), 0xFEFF);
        assert_eq!(
            DiagnosticFlags::STATUS | DiagnosticFlags::ALERT_CONFIGURATION,
            DiagnosticFlags::all()
        );
        assert!(!DiagnosticFlags::STATUS.intersects(DiagnosticFlags::ALERT_CONFIGURATION));
    }

    #[test]
    fn reserved_bit_is_dropped() {
        let flags = decode(0x0100);
        assert!(flags.is_empty());
    }

    #[test]
    fn alert_configuration_never_writes_status() {
        let read = decode(0xFFFF);
        let conf = AlertConfiguration::from(read);
        assert_eq!(
            conf,
            AlertConfiguration {
                latch: true,
                conversion_ready_on_alert: true,
                alert_on_average: true,
                polarity: AlertPolarity::ActiveHigh,
            }
        );
        assert_eq!(conf.as_bits(), 0xF000);
        assert_eq!(conf.as_bits() & DiagnosticFlags::STATUS.bits(), 0);
        assert_eq!(AlertConfiguration::default().as_bits(), 0x0000);
    }

    #[test]
    fn alert_configuration_round_trips() {
        for bits in 0..16u16 {
            let flags = DiagnosticFlags::from_bits_truncate(bits << 12);
            let conf = AlertConfiguration::from(flags);
            assert_eq!(conf.as_bits(), bits << 12);
        }
    }
}
