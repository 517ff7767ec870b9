//! Typed values and the primitive codec.
//!
//! [`Value`] has one variant per physical type, each carrying the narrowest
//! exact native representation. [`Value::encode`] and [`Value::decode`] are
//! the primitive codec: every value is little-endian on disk regardless of
//! host endianness, GUIDs use the Microsoft mixed-endian byte layout, and
//! timestamps go through the epoch arithmetic in [`crate::timestamp`].
//!
//! The `as_*` methods are the narrow coercion surface. A coercion that
//! would lose information (negative into unsigned, complex into real, ...)
//! is an error, never a silent widening.

use bytes::BufMut;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::physical_type::PhysicalType;
use crate::timestamp::Timestamp;

/// A single decoded value of one of the PQDIF physical types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Boolean1(bool),
    Boolean2(bool),
    Boolean4(bool),
    Char1(u8),
    Char2(u16),
    Integer1(i8),
    Integer2(i16),
    Integer4(i32),
    UnsignedInteger1(u8),
    UnsignedInteger2(u16),
    UnsignedInteger4(u32),
    Real4(f32),
    Real8(f64),
    /// Real and imaginary parts, each Real4.
    Complex8(f32, f32),
    /// Real and imaginary parts, each Real8.
    Complex16(f64, f64),
    Timestamp(Timestamp),
    Guid(Uuid),
}

impl Value {
    /// The physical type this value encodes as.
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Value::Boolean1(_) => PhysicalType::Boolean1,
            Value::Boolean2(_) => PhysicalType::Boolean2,
            Value::Boolean4(_) => PhysicalType::Boolean4,
            Value::Char1(_) => PhysicalType::Char1,
            Value::Char2(_) => PhysicalType::Char2,
            Value::Integer1(_) => PhysicalType::Integer1,
            Value::Integer2(_) => PhysicalType::Integer2,
            Value::Integer4(_) => PhysicalType::Integer4,
            Value::UnsignedInteger1(_) => PhysicalType::UnsignedInteger1,
            Value::UnsignedInteger2(_) => PhysicalType::UnsignedInteger2,
            Value::UnsignedInteger4(_) => PhysicalType::UnsignedInteger4,
            Value::Real4(_) => PhysicalType::Real4,
            Value::Real8(_) => PhysicalType::Real8,
            Value::Complex8(_, _) => PhysicalType::Complex8,
            Value::Complex16(_, _) => PhysicalType::Complex16,
            Value::Timestamp(_) => PhysicalType::Timestamp,
            Value::Guid(_) => PhysicalType::Guid,
        }
    }

    /// On-disk size in bytes.
    pub fn byte_size(&self) -> usize {
        self.physical_type().byte_size()
    }

    /// Encodes the little-endian on-disk representation.
    pub fn encode(&self, buf: &mut impl BufMut) {
        match *self {
            Value::Boolean1(v) => buf.put_u8(v as u8),
            Value::Boolean2(v) => buf.put_u16_le(v as u16),
            Value::Boolean4(v) => buf.put_u32_le(v as u32),
            Value::Char1(v) => buf.put_u8(v),
            Value::Char2(v) => buf.put_u16_le(v),
            Value::Integer1(v) => buf.put_i8(v),
            Value::Integer2(v) => buf.put_i16_le(v),
            Value::Integer4(v) => buf.put_i32_le(v),
            Value::UnsignedInteger1(v) => buf.put_u8(v),
            Value::UnsignedInteger2(v) => buf.put_u16_le(v),
            Value::UnsignedInteger4(v) => buf.put_u32_le(v),
            Value::Real4(v) => buf.put_f32_le(v),
            Value::Real8(v) => buf.put_f64_le(v),
            Value::Complex8(re, im) => {
                buf.put_f32_le(re);
                buf.put_f32_le(im);
            }
            Value::Complex16(re, im) => {
                buf.put_f64_le(re);
                buf.put_f64_le(im);
            }
            Value::Timestamp(ts) => ts.encode(buf),
            Value::Guid(id) => buf.put_slice(&id.to_bytes_le()),
        }
    }

    /// Decodes a value of the given physical type from the start of `bytes`.
    ///
    /// Fails if the buffer is shorter than the type's byte size. Extra
    /// trailing bytes are ignored so callers can pass a whole buffer.
    pub fn decode(value_type: PhysicalType, bytes: &[u8]) -> Result<Value> {
        let size = value_type.byte_size();
        if bytes.len() < size {
            return Err(Error::BufferTooShort {
                needed: size,
                available: bytes.len(),
            });
        }

        let value = match value_type {
            PhysicalType::Boolean1 => Value::Boolean1(bytes[0] != 0),
            PhysicalType::Boolean2 => Value::Boolean2(read_u16(bytes) != 0),
            PhysicalType::Boolean4 => Value::Boolean4(read_u32(bytes) != 0),
            PhysicalType::Char1 => Value::Char1(bytes[0]),
            PhysicalType::Char2 => Value::Char2(read_u16(bytes)),
            PhysicalType::Integer1 => Value::Integer1(bytes[0] as i8),
            PhysicalType::Integer2 => Value::Integer2(read_u16(bytes) as i16),
            PhysicalType::Integer4 => Value::Integer4(read_u32(bytes) as i32),
            PhysicalType::UnsignedInteger1 => Value::UnsignedInteger1(bytes[0]),
            PhysicalType::UnsignedInteger2 => Value::UnsignedInteger2(read_u16(bytes)),
            PhysicalType::UnsignedInteger4 => Value::UnsignedInteger4(read_u32(bytes)),
            PhysicalType::Real4 => Value::Real4(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
            PhysicalType::Real8 => Value::Real8(read_f64(bytes)),
            PhysicalType::Complex8 => Value::Complex8(
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
                f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            ),
            PhysicalType::Complex16 => {
                Value::Complex16(read_f64(bytes), read_f64(&bytes[8..]))
            }
            PhysicalType::Timestamp => Value::Timestamp(Timestamp::decode(bytes)?),
            PhysicalType::Guid => {
                let mut raw = [0u8; 16];
                raw.copy_from_slice(&bytes[..16]);
                Value::Guid(Uuid::from_bytes_le(raw))
            }
        };

        Ok(value)
    }

    /// Numeric coercion to f64. Integer and real variants only.
    pub fn as_f64(&self) -> Result<f64> {
        match *self {
            Value::Integer1(v) => Ok(f64::from(v)),
            Value::Integer2(v) => Ok(f64::from(v)),
            Value::Integer4(v) => Ok(f64::from(v)),
            Value::UnsignedInteger1(v) => Ok(f64::from(v)),
            Value::UnsignedInteger2(v) => Ok(f64::from(v)),
            Value::UnsignedInteger4(v) => Ok(f64::from(v)),
            Value::Real4(v) => Ok(f64::from(v)),
            Value::Real8(v) => Ok(v),
            other => Err(Error::Coercion(other.physical_type(), "f64")),
        }
    }

    /// Integer coercion to u32. Fails on negative values and non-integers.
    pub fn as_u32(&self) -> Result<u32> {
        match *self {
            Value::Integer1(v) if v >= 0 => Ok(v as u32),
            Value::Integer2(v) if v >= 0 => Ok(v as u32),
            Value::Integer4(v) if v >= 0 => Ok(v as u32),
            Value::UnsignedInteger1(v) => Ok(u32::from(v)),
            Value::UnsignedInteger2(v) => Ok(u32::from(v)),
            Value::UnsignedInteger4(v) => Ok(v),
            other => Err(Error::Coercion(other.physical_type(), "u32")),
        }
    }

    /// Integer coercion to i32. Fails on out-of-range and non-integers.
    pub fn as_i32(&self) -> Result<i32> {
        match *self {
            Value::Integer1(v) => Ok(i32::from(v)),
            Value::Integer2(v) => Ok(i32::from(v)),
            Value::Integer4(v) => Ok(v),
            Value::UnsignedInteger1(v) => Ok(i32::from(v)),
            Value::UnsignedInteger2(v) => Ok(i32::from(v)),
            Value::UnsignedInteger4(v) if v <= i32::MAX as u32 => Ok(v as i32),
            other => Err(Error::Coercion(other.physical_type(), "i32")),
        }
    }

    /// Boolean variants only.
    pub fn as_bool(&self) -> Result<bool> {
        match *self {
            Value::Boolean1(v) | Value::Boolean2(v) | Value::Boolean4(v) => Ok(v),
            other => Err(Error::Coercion(other.physical_type(), "bool")),
        }
    }

    /// Guid variant only.
    pub fn as_uuid(&self) -> Result<Uuid> {
        match *self {
            Value::Guid(id) => Ok(id),
            other => Err(Error::Coercion(other.physical_type(), "uuid")),
        }
    }

    /// Timestamp variant only.
    pub fn as_timestamp(&self) -> Result<Timestamp> {
        match *self {
            Value::Timestamp(ts) => Ok(ts),
            other => Err(Error::Coercion(other.physical_type(), "timestamp")),
        }
    }
}

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_f64(bytes: &[u8]) -> f64 {
    f64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn roundtrip(value: Value) -> Value {
        let mut buf = BytesMut::new();
        value.encode(&mut buf);
        assert_eq!(buf.len(), value.byte_size());
        Value::decode(value.physical_type(), &buf).unwrap()
    }

    // ---------------------------------------------------------------
    // Codec round-trips
    // ---------------------------------------------------------------

    #[test]
    fn test_integer_roundtrips() {
        assert_eq!(roundtrip(Value::Integer1(-5)), Value::Integer1(-5));
        assert_eq!(roundtrip(Value::Integer2(-1234)), Value::Integer2(-1234));
        assert_eq!(
            roundtrip(Value::Integer4(-7_654_321)),
            Value::Integer4(-7_654_321)
        );
        assert_eq!(
            roundtrip(Value::UnsignedInteger4(u32::MAX)),
            Value::UnsignedInteger4(u32::MAX)
        );
    }

    #[test]
    fn test_real_and_complex_roundtrips() {
        assert_eq!(roundtrip(Value::Real4(1.5)), Value::Real4(1.5));
        assert_eq!(roundtrip(Value::Real8(-2.25e100)), Value::Real8(-2.25e100));
        assert_eq!(
            roundtrip(Value::Complex8(1.0, -2.0)),
            Value::Complex8(1.0, -2.0)
        );
        assert_eq!(
            roundtrip(Value::Complex16(3.5, 4.5)),
            Value::Complex16(3.5, 4.5)
        );
    }

    #[test]
    fn test_boolean_roundtrips() {
        assert_eq!(roundtrip(Value::Boolean1(true)), Value::Boolean1(true));
        assert_eq!(roundtrip(Value::Boolean2(false)), Value::Boolean2(false));
        assert_eq!(roundtrip(Value::Boolean4(true)), Value::Boolean4(true));
    }

    #[test]
    fn test_guid_uses_mixed_endian_layout() {
        let id = Uuid::parse_str("89738607-f1c3-11cf-9d89-0080c72e70a3").unwrap();
        let mut buf = BytesMut::new();
        Value::Guid(id).encode(&mut buf);
        // First three fields little-endian, final eight bytes in order.
        assert_eq!(
            buf.as_ref(),
            [
                0x07, 0x86, 0x73, 0x89, 0xc3, 0xf1, 0xcf, 0x11, 0x9d, 0x89, 0x00, 0x80, 0xc7,
                0x2e, 0x70, 0xa3
            ]
        );
        assert_eq!(roundtrip(Value::Guid(id)), Value::Guid(id));
    }

    #[test]
    fn test_values_are_little_endian_on_disk() {
        let mut buf = BytesMut::new();
        Value::UnsignedInteger4(0x11223344).encode(&mut buf);
        assert_eq!(buf.as_ref(), [0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_decode_short_buffer() {
        assert!(Value::decode(PhysicalType::Real8, &[0u8; 7]).is_err());
        assert!(Value::decode(PhysicalType::Guid, &[0u8; 15]).is_err());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let value = Value::decode(PhysicalType::UnsignedInteger2, &[0x2A, 0x00, 0xFF, 0xFF]);
        assert_eq!(value.unwrap(), Value::UnsignedInteger2(42));
    }

    // ---------------------------------------------------------------
    // Coercions
    // ---------------------------------------------------------------

    #[test]
    fn test_as_f64_numeric_only() {
        assert_eq!(Value::Integer2(-3).as_f64().unwrap(), -3.0);
        assert_eq!(Value::UnsignedInteger1(200).as_f64().unwrap(), 200.0);
        assert_eq!(Value::Real4(0.5).as_f64().unwrap(), 0.5);
        assert!(Value::Boolean1(true).as_f64().is_err());
        assert!(Value::Complex8(1.0, 1.0).as_f64().is_err());
        assert!(Value::Guid(Uuid::nil()).as_f64().is_err());
    }

    #[test]
    fn test_as_u32_rejects_negative() {
        assert_eq!(Value::Integer4(7).as_u32().unwrap(), 7);
        assert!(Value::Integer4(-7).as_u32().is_err());
        assert!(Value::Real8(1.0).as_u32().is_err());
    }

    #[test]
    fn test_as_i32_range_checked() {
        assert_eq!(Value::UnsignedInteger4(5).as_i32().unwrap(), 5);
        assert!(Value::UnsignedInteger4(u32::MAX).as_i32().is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let id = Uuid::parse_str("4a111440-e49f-11cf-9900-505144494600").unwrap();
        assert_eq!(Value::Guid(id).as_uuid().unwrap(), id);
        assert!(Value::Real8(1.0).as_uuid().is_err());

        let ts = Timestamp {
            days: 25_569,
            seconds: 0.0,
        };
        assert_eq!(Value::Timestamp(ts).as_timestamp().unwrap(), ts);
        assert!(Value::Boolean4(false).as_timestamp().is_err());
        assert!(Value::Boolean4(false).as_bool().is_ok());
    }
}
