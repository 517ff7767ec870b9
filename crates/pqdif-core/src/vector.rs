//! Vector elements.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::physical_type::PhysicalType;
use crate::value::Value;

/// A tagged array of values of one physical type.
///
/// The backing buffer always holds exactly `size × value_type.byte_size()`
/// bytes of little-endian values; reassigning either dimension reallocates
/// the buffer zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorElement {
    /// Tag identifying what this array means.
    pub tag: Uuid,
    value_type: PhysicalType,
    size: usize,
    buffer: Vec<u8>,
}

impl VectorElement {
    /// Creates an empty vector of the given type.
    pub fn new(tag: Uuid, value_type: PhysicalType) -> Self {
        VectorElement {
            tag,
            value_type,
            size: 0,
            buffer: Vec::new(),
        }
    }

    /// Builds a vector directly over raw little-endian bytes.
    ///
    /// `data.len()` must equal `size × value_type.byte_size()`.
    pub fn from_raw(tag: Uuid, value_type: PhysicalType, size: usize, data: Vec<u8>) -> Result<Self> {
        let expected = size * value_type.byte_size();
        if data.len() != expected {
            return Err(Error::BufferTooShort {
                needed: expected,
                available: data.len(),
            });
        }
        Ok(VectorElement {
            tag,
            value_type,
            size,
            buffer: data,
        })
    }

    pub fn value_type(&self) -> PhysicalType {
        self.value_type
    }

    /// Element count.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw little-endian backing bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Resizes the vector, discarding current contents.
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
        self.buffer = vec![0u8; size * self.value_type.byte_size()];
    }

    /// Changes the element type, discarding current contents.
    pub fn set_value_type(&mut self, value_type: PhysicalType) {
        self.value_type = value_type;
        self.buffer = vec![0u8; self.size * value_type.byte_size()];
    }

    /// Decodes the element at `index`.
    pub fn get(&self, index: usize) -> Result<Value> {
        if index >= self.size {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        let width = self.value_type.byte_size();
        Value::decode(self.value_type, &self.buffer[index * width..])
    }

    /// Encodes `value` at `index`. The value's type must match.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        if index >= self.size {
            return Err(Error::IndexOutOfBounds {
                index,
                size: self.size,
            });
        }
        if value.physical_type() != self.value_type {
            return Err(Error::ValueTypeMismatch {
                expected: self.value_type,
                found: value.physical_type(),
            });
        }
        let width = self.value_type.byte_size();
        let mut slot = &mut self.buffer[index * width..(index + 1) * width];
        value.encode(&mut slot);
        Ok(())
    }

    /// Decodes every element in order.
    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.size).map(|i| self.get(i)).collect()
    }

    /// Replaces the contents with `values`, which must all share one type.
    pub fn set_values(&mut self, values: &[Value]) -> Result<()> {
        if let Some(first) = values.first() {
            self.set_value_type(first.physical_type());
        }
        self.set_size(values.len());
        for (i, value) in values.iter().enumerate() {
            self.set(i, *value)?;
        }
        Ok(())
    }

    /// Decodes a Char1 (ASCII) or Char2 (UTF-16LE) vector as text,
    /// stopping at the first NUL terminator.
    pub fn get_string(&self) -> Result<String> {
        match self.value_type {
            PhysicalType::Char1 => {
                let end = self
                    .buffer
                    .iter()
                    .position(|&b| b == 0)
                    .unwrap_or(self.buffer.len());
                Ok(self.buffer[..end].iter().map(|&b| b as char).collect())
            }
            PhysicalType::Char2 => {
                let units: Vec<u16> = self
                    .buffer
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .take_while(|&unit| unit != 0)
                    .collect();
                Ok(String::from_utf16_lossy(&units))
            }
            other => Err(Error::Coercion(other, "string")),
        }
    }

    /// Stores `text` as a NUL-terminated Char1 vector.
    pub fn set_string(&mut self, text: &str) {
        self.value_type = PhysicalType::Char1;
        self.size = text.len() + 1;
        self.buffer = text.bytes().chain(std::iter::once(0)).collect();
    }
}
