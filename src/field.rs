//! Bit-field packing and unpacking over register words
//!
//! Every register of the INA228 is treated as an unsigned word of up to 40 bits held in a `u64`. A
//! [`Field`] names a run of bits inside such a word and knows whether those bits hold a two's
//! complement value.
//!
//! # Example
//! ```rust
//! use ina228::field::Field;
//!
//! // The shunt voltage is a 20 bit signed value stored in bits 23..=4
//! let shunt = Field::signed(4, 20);
//! assert_eq!(shunt.unpack(0xFF_FFF0), -1);
//! assert_eq!(shunt.unpack(0x00_0010), 1);
//!
//! // Packing only touches the bits of the field
//! let mode = Field::unsigned(12, 4);
//! assert_eq!(mode.pack(0xABCD, 0x3).unwrap(), 0x3BCD);
//! ```

use crate::errors::CodecRangeError;

/// A run of bits inside a register word
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Field {
    offset: u8,
    width: u8,
    signed: bool,
}

impl Field {
    /// A field holding an unsigned value
    ///
    /// # Panics
    /// If the width is zero or the field does not fit into 64 bits. As fields are `const` this
    /// fails the build rather than at runtime.
    #[must_use]
    pub const fn unsigned(offset: u8, width: u8) -> Self {
        Self::new(offset, width, false)
    }

    /// A field holding a two's complement value
    ///
    /// # Panics
    /// Same as [`Self::unsigned`].
    #[must_use]
    pub const fn signed(offset: u8, width: u8) -> Self {
        Self::new(offset, width, true)
    }

    const fn new(offset: u8, width: u8, signed: bool) -> Self {
        assert!(width > 0 && width < 64, "field width must be in 1..=63");
        assert!(offset as u32 + width as u32 <= 64, "field must fit into 64 bits");
        Self {
            offset,
            width,
            signed,
        }
    }

    /// Position of the lowest bit of the field
    #[must_use]
    pub const fn offset(self) -> u8 {
        self.offset
    }

    /// Number of bits in the field
    #[must_use]
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Whether the field is interpreted as two's complement
    #[must_use]
    pub const fn is_signed(self) -> bool {
        self.signed
    }

    const fn value_mask(self) -> u64 {
        (1 << self.width) - 1
    }

    /// Mask selecting the bits of this field in the register word
    #[must_use]
    pub const fn mask(self) -> u64 {
        self.value_mask() << self.offset
    }

    /// Smallest value that can be stored in the field
    #[must_use]
    pub const fn min(self) -> i64 {
        if self.signed {
            -(1 << (self.width - 1))
        } else {
            0
        }
    }

    /// Largest value that can be stored in the field
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // width is at most 63
    pub const fn max(self) -> i64 {
        if self.signed {
            (1 << (self.width - 1)) - 1
        } else {
            self.value_mask() as i64
        }
    }

    /// Bits of the field shifted down, without any sign handling
    #[must_use]
    pub const fn extract(self, word: u64) -> u64 {
        (word >> self.offset) & self.value_mask()
    }

    /// Value of the field, sign extended if the field is signed
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // width is at most 63
    pub const fn unpack(self, word: u64) -> i64 {
        let raw = self.extract(word);
        if self.signed {
            sign_extend(raw, self.width)
        } else {
            raw as i64
        }
    }

    /// Store `value` in the field, keeping all other bits of `word`
    ///
    /// # Errors
    /// Returns a [`CodecRangeError`] if `value` does not fit into the field. Use
    /// [`Self::pack_truncating`] to get the behavior of the device which just drops the upper bits.
    pub const fn pack(self, word: u64, value: i64) -> Result<u64, CodecRangeError> {
        if value < self.min() || value > self.max() {
            return Err(CodecRangeError { field: self, value });
        }
        Ok(self.pack_truncating(word, value))
    }

    /// Store the lowest `width` bits of `value` in the field, keeping all other bits of `word`
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // The two's complement bits are what we want here
    pub const fn pack_truncating(self, word: u64, value: i64) -> u64 {
        (word & !self.mask()) | (((value as u64) & self.value_mask()) << self.offset)
    }
}

/// Interpret the lowest `width` bits of `raw` as a two's complement number
///
/// Bits above `width` are ignored.
///
/// ```rust
/// # use ina228::field::sign_extend;
/// assert_eq!(sign_extend(0xF_FFFF, 20), -1);
/// assert_eq!(sign_extend(0x8_0000, 20), -524_288);
/// assert_eq!(sign_extend(0x7_FFFF, 20), 524_287);
/// ```
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn sign_extend(raw: u64, width: u8) -> i64 {
    let shift = 64 - width as u32;
    ((raw << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ones_is_minus_one() {
        for width in 1..=40 {
            let field = Field::signed(0, width);
            assert_eq!(field.unpack(field.mask()), -1, "width {width}");
        }
    }

    #[test]
    fn top_bit_is_minimum() {
        for width in 1..=40 {
            let field = Field::signed(0, width);
            let top = 1u64 << (width - 1);
            assert_eq!(field.unpack(top), field.min(), "width {width}");
            assert_eq!(field.min(), -(1i64 << (width - 1)));
        }
    }

    #[test]
    fn unsigned_fields_never_go_negative() {
        let field = Field::unsigned(4, 20);
        assert_eq!(field.unpack(0xFF_FFF0), 0xF_FFFF);
        assert_eq!(field.unpack(0xFF_FFFF), 0xF_FFFF);
    }

    #[test]
    fn reserved_bits_are_ignored() {
        let field = Field::signed(4, 20);
        assert_eq!(field.unpack(0x00_001F), 1);
        assert_eq!(field.unpack(0xFF_FF00_0010), 1);
    }

    #[test]
    fn pack_preserves_other_bits() {
        let mode = Field::unsigned(12, 4);
        for value in 0..=0xF {
            let word = mode.pack(0xABCD, value).unwrap();
            assert_eq!(word & 0x0FFF, 0x0BCD);
            assert_eq!(mode.unpack(word), value);
        }
    }

    #[test]
    fn pack_signed_values() {
        let field = Field::signed(0, 16);
        assert_eq!(field.pack(0, -1).unwrap(), 0xFFFF);
        assert_eq!(field.pack(0xFFFF_0000, -2).unwrap(), 0xFFFF_FFFE);
        assert_eq!(field.pack(0, i64::from(i16::MIN)).unwrap(), 0x8000);
    }

    #[test]
    fn pack_rejects_out_of_range() {
        let field = Field::unsigned(0, 15);
        assert_eq!(
            field.pack(0, 0x8000),
            Err(CodecRangeError {
                field,
                value: 0x8000
            })
        );
        assert!(field.pack(0, -1).is_err());

        let field = Field::signed(0, 16);
        assert!(field.pack(0, 32_768).is_err());
        assert!(field.pack(0, -32_769).is_err());
    }

    #[test]
    fn truncating_pack_drops_upper_bits() {
        let field = Field::unsigned(6, 8);
        assert_eq!(field.pack_truncating(0, 0x1FF), 0xFF << 6);
        assert_eq!(field.pack_truncating(0b11_1111, -1), 0x3FFF);
    }

    #[test]
    fn forty_bit_fields() {
        let energy = Field::unsigned(0, 40);
        let charge = Field::signed(0, 40);

        assert_eq!(energy.unpack(0), 0);
        assert_eq!(charge.unpack(0), 0);

        assert_eq!(energy.unpack(0xFF_FFFF_FFFF), 0xFF_FFFF_FFFF);
        assert_eq!(charge.unpack(0xFF_FFFF_FFFF), -1);
        assert_eq!(charge.unpack(0x80_0000_0000), -(1 << 39));
        assert_eq!(charge.max(), (1 << 39) - 1);
    }
}
