//! Scalar elements.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::physical_type::PhysicalType;
use crate::timestamp::Timestamp;
use crate::value::Value;

/// A tagged single value.
///
/// The backing buffer is always 16 bytes, the size of the largest physical
/// type, and holds the value's little-endian on-disk representation
/// left-justified. Only the first `value_type.byte_size()` bytes are
/// meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarElement {
    /// Tag identifying what this value means.
    pub tag: Uuid,
    value_type: PhysicalType,
    buffer: [u8; 16],
}

impl ScalarElement {
    /// Creates a zeroed scalar of the given type.
    pub fn new(tag: Uuid, value_type: PhysicalType) -> Self {
        ScalarElement {
            tag,
            value_type,
            buffer: [0u8; 16],
        }
    }

    /// Creates a scalar holding the given value.
    pub fn with_value(tag: Uuid, value: Value) -> Self {
        let mut scalar = ScalarElement::new(tag, value.physical_type());
        scalar.set(value);
        scalar
    }

    pub fn value_type(&self) -> PhysicalType {
        self.value_type
    }

    /// Reinterprets the buffer as the given type without touching its bytes.
    pub fn set_value_type(&mut self, value_type: PhysicalType) {
        self.value_type = value_type;
    }

    /// Decodes the stored value.
    pub fn get(&self) -> Result<Value> {
        Value::decode(self.value_type, &self.buffer)
    }

    /// Stores a value, adopting its physical type.
    pub fn set(&mut self, value: Value) {
        self.value_type = value.physical_type();
        self.buffer = [0u8; 16];
        let mut cursor = &mut self.buffer[..];
        value.encode(&mut cursor);
    }

    /// Copy of the meaningful bytes, sized to the value type.
    pub fn get_bytes(&self) -> Vec<u8> {
        self.buffer[..self.value_type.byte_size()].to_vec()
    }

    /// Copies `value_type.byte_size()` bytes from `src` into the buffer.
    pub fn set_bytes(&mut self, src: &[u8]) -> Result<()> {
        let size = self.value_type.byte_size();
        if src.len() < size {
            return Err(Error::BufferTooShort {
                needed: size,
                available: src.len(),
            });
        }
        self.buffer = [0u8; 16];
        self.buffer[..size].copy_from_slice(&src[..size]);
        Ok(())
    }

    // Typed conveniences used throughout the logical views.

    pub fn get_uuid(&self) -> Result<Uuid> {
        self.get()?.as_uuid()
    }

    pub fn set_uuid(&mut self, id: Uuid) {
        self.set(Value::Guid(id));
    }

    pub fn get_timestamp(&self) -> Result<Timestamp> {
        self.get()?.as_timestamp()
    }

    pub fn set_timestamp(&mut self, ts: Timestamp) {
        self.set(Value::Timestamp(ts));
    }

    pub fn get_u32(&self) -> Result<u32> {
        self.get()?.as_u32()
    }

    pub fn set_u32(&mut self, v: u32) {
        self.set(Value::UnsignedInteger4(v));
    }

    pub fn get_bool(&self) -> Result<bool> {
        self.get()?.as_bool()
    }

    pub fn set_bool(&mut self, v: bool) {
        self.set(Value::Boolean4(v));
    }

    pub fn get_f64(&self) -> Result<f64> {
        self.get()?.as_f64()
    }

    pub fn set_f64(&mut self, v: f64) {
        self.set(Value::Real8(v));
    }
}
