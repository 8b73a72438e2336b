//! I2C address of the INA228 on the bus
//!
//! The two strap pins A0 and A1 can each be tied to one of four signals which gives 16 addresses
//! from `0x40` to `0x4F`, see table 7-2 of the datasheet.

use core::fmt::{Display, Formatter};

/// Signal an address pin is tied to
///
/// The discriminant is the two bit code the pin contributes to the address.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Pin {
    /// Ground
    Gnd = 0b00,
    /// Supply voltage
    Vs = 0b01,
    /// I2C data line
    Sda = 0b10,
    /// I2C clock line
    Scl = 0b11,
}

impl Pin {
    /// Every pin in code order
    pub const ALL: [Self; 4] = [Self::Gnd, Self::Vs, Self::Sda, Self::Scl];

    /// The two bits this pin contributes
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b11) as usize]
    }
}

/// 7-bit I2C address of an INA228
///
/// ```rust
/// use ina228::address::{Address, Pin};
///
/// let address = Address::from_pins(Pin::Vs, Pin::Gnd);
/// assert_eq!(address.as_byte(), 0x41);
/// assert_eq!(Address::try_from(0x41), Ok(address));
/// assert!(Address::from_byte(0x50).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Lowest address, both pins on ground
    pub const MIN: u8 = 0x40;
    /// Highest address, both pins on SCL
    pub const MAX: u8 = 0x4F;

    /// Address selected by the strap pins
    #[must_use]
    pub const fn from_pins(a0: Pin, a1: Pin) -> Self {
        Self(Self::MIN | (a1.bits() << 2) | a0.bits())
    }

    /// Use a raw address
    ///
    /// # Errors
    /// Returns [`OutOfRange`] if `byte` is not in `0x40..=0x4F`.
    pub const fn from_byte(byte: u8) -> Result<Self, OutOfRange> {
        if byte >= Self::MIN && byte <= Self::MAX {
            Ok(Self(byte))
        } else {
            Err(OutOfRange(byte))
        }
    }

    /// The address as used on the bus
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// The strap pins as `(A0, A1)`
    #[must_use]
    pub const fn as_pins(self) -> (Pin, Pin) {
        (Pin::from_bits(self.0), Pin::from_bits(self.0 >> 2))
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::from_pins(Pin::Gnd, Pin::Gnd)
    }
}

impl TryFrom<u8> for Address {
    type Error = OutOfRange;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte)
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// A byte that is not an INA228 address
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct OutOfRange(pub u8);

impl Display for OutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Address {:#04x} out of range, should be in range: {:#04x}..={:#04x}",
            self.0,
            Address::MIN,
            Address::MAX,
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasheet_table() {
        use Pin::{Gnd, Scl, Sda, Vs};

        let table = [
            // A1, A0, address
            (Gnd, Gnd, 0x40),
            (Gnd, Vs, 0x41),
            (Gnd, Sda, 0x42),
            (Gnd, Scl, 0x43),
            (Vs, Gnd, 0x44),
            (Vs, Vs, 0x45),
            (Vs, Sda, 0x46),
            (Vs, Scl, 0x47),
            (Sda, Gnd, 0x48),
            (Sda, Vs, 0x49),
            (Sda, Sda, 0x4A),
            (Sda, Scl, 0x4B),
            (Scl, Gnd, 0x4C),
            (Scl, Vs, 0x4D),
            (Scl, Sda, 0x4E),
            (Scl, Scl, 0x4F),
        ];

        for (a1, a0, byte) in table {
            let address = Address::from_pins(a0, a1);
            assert_eq!(address.as_byte(), byte);
            assert_eq!(Address::from_byte(byte).unwrap().as_pins(), (a0, a1));
        }
    }

    #[test]
    fn out_of_range() {
        assert_eq!(Address::from_byte(0x3F), Err(OutOfRange(0x3F)));
        assert_eq!(Address::try_from(0x50), Err(OutOfRange(0x50)));
        assert_eq!(
            OutOfRange(0x50).to_string(),
            "Address 0x50 out of range, should be in range: 0x40..=0x4f"
        );
        assert_eq!(u8::from(Address::default()), 0x40);
    }
}
