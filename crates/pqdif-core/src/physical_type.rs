//! The closed set of fixed-width physical value types.
//!
//! Every scalar and vector element in a PQDIF file declares one of these
//! types in its element header. The discriminant values are fixed by the
//! standard and appear on disk as a single byte; the byte size of each
//! variant is an invariant shared by the codec and the element tree.

use std::fmt;

use crate::error::Error;

/// Physical value type of a scalar or vector element.
///
/// The discriminants are the on-disk byte values defined by IEEE 1159.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PhysicalType {
    /// 1-byte boolean, nonzero = true.
    Boolean1 = 1,
    /// 2-byte boolean.
    Boolean2 = 2,
    /// 4-byte boolean.
    Boolean4 = 3,
    /// 8-bit ASCII character.
    Char1 = 10,
    /// 16-bit UTF-16LE code unit.
    Char2 = 11,
    /// Signed 8-bit integer.
    Integer1 = 20,
    /// Signed 16-bit integer.
    Integer2 = 21,
    /// Signed 32-bit integer.
    Integer4 = 22,
    /// Unsigned 8-bit integer.
    UnsignedInteger1 = 30,
    /// Unsigned 16-bit integer.
    UnsignedInteger2 = 31,
    /// Unsigned 32-bit integer.
    UnsignedInteger4 = 32,
    /// 32-bit IEEE 754 float.
    Real4 = 40,
    /// 64-bit IEEE 754 float.
    Real8 = 41,
    /// Two consecutive Real4 values (real, imaginary).
    Complex8 = 42,
    /// Two consecutive Real8 values (real, imaginary).
    Complex16 = 43,
    /// 12 bytes: u32 days since 1900-01-01 plus f64 seconds since midnight.
    Timestamp = 50,
    /// 16-byte globally unique identifier in the Microsoft mixed-endian layout.
    Guid = 60,
}

impl PhysicalType {
    /// On-disk size of a single value of this type, in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            PhysicalType::Boolean1 => 1,
            PhysicalType::Boolean2 => 2,
            PhysicalType::Boolean4 => 4,
            PhysicalType::Char1 => 1,
            PhysicalType::Char2 => 2,
            PhysicalType::Integer1 => 1,
            PhysicalType::Integer2 => 2,
            PhysicalType::Integer4 => 4,
            PhysicalType::UnsignedInteger1 => 1,
            PhysicalType::UnsignedInteger2 => 2,
            PhysicalType::UnsignedInteger4 => 4,
            PhysicalType::Real4 => 4,
            PhysicalType::Real8 => 8,
            PhysicalType::Complex8 => 8,
            PhysicalType::Complex16 => 16,
            PhysicalType::Timestamp => 12,
            PhysicalType::Guid => 16,
        }
    }

    /// Whether a scalar of this type is stored inline in its parent's
    /// 28-byte element header. Only values strictly smaller than the 8
    /// inline payload bytes are embedded; everything else is linked.
    pub fn is_embeddable(self) -> bool {
        self.byte_size() < 8
    }
}

impl TryFrom<u8> for PhysicalType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(PhysicalType::Boolean1),
            2 => Ok(PhysicalType::Boolean2),
            3 => Ok(PhysicalType::Boolean4),
            10 => Ok(PhysicalType::Char1),
            11 => Ok(PhysicalType::Char2),
            20 => Ok(PhysicalType::Integer1),
            21 => Ok(PhysicalType::Integer2),
            22 => Ok(PhysicalType::Integer4),
            30 => Ok(PhysicalType::UnsignedInteger1),
            31 => Ok(PhysicalType::UnsignedInteger2),
            32 => Ok(PhysicalType::UnsignedInteger4),
            40 => Ok(PhysicalType::Real4),
            41 => Ok(PhysicalType::Real8),
            42 => Ok(PhysicalType::Complex8),
            43 => Ok(PhysicalType::Complex16),
            50 => Ok(PhysicalType::Timestamp),
            60 => Ok(PhysicalType::Guid),
            other => Err(Error::UnknownPhysicalType(other)),
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_sizes() {
        assert_eq!(PhysicalType::Boolean1.byte_size(), 1);
        assert_eq!(PhysicalType::Boolean2.byte_size(), 2);
        assert_eq!(PhysicalType::Boolean4.byte_size(), 4);
        assert_eq!(PhysicalType::Char1.byte_size(), 1);
        assert_eq!(PhysicalType::Char2.byte_size(), 2);
        assert_eq!(PhysicalType::Integer4.byte_size(), 4);
        assert_eq!(PhysicalType::Real8.byte_size(), 8);
        assert_eq!(PhysicalType::Complex8.byte_size(), 8);
        assert_eq!(PhysicalType::Complex16.byte_size(), 16);
        assert_eq!(PhysicalType::Timestamp.byte_size(), 12);
        assert_eq!(PhysicalType::Guid.byte_size(), 16);
    }

    #[test]
    fn test_roundtrip_all_discriminants() {
        for raw in [1u8, 2, 3, 10, 11, 20, 21, 22, 30, 31, 32, 40, 41, 42, 43, 50, 60] {
            let ty = PhysicalType::try_from(raw).unwrap();
            assert_eq!(ty as u8, raw);
        }
    }

    #[test]
    fn test_unknown_discriminant_rejected() {
        for raw in [0u8, 4, 12, 23, 33, 44, 51, 61, 255] {
            assert!(PhysicalType::try_from(raw).is_err(), "value {}", raw);
        }
    }

    #[test]
    fn test_embeddable_boundary() {
        // Strictly smaller than 8 bytes is embeddable; 8 and up is linked.
        assert!(PhysicalType::Boolean1.is_embeddable());
        assert!(PhysicalType::Integer4.is_embeddable());
        assert!(PhysicalType::Real4.is_embeddable());
        assert!(!PhysicalType::Real8.is_embeddable());
        assert!(!PhysicalType::Complex8.is_embeddable());
        assert!(!PhysicalType::Timestamp.is_embeddable());
        assert!(!PhysicalType::Guid.is_embeddable());
    }
}
