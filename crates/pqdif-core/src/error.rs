//! Error types for the core layer.
//!
//! Everything in this crate operates on in-memory buffers, so the failures
//! here are value-level: a byte that doesn't name a physical type, a buffer
//! that's too short for the type it claims to hold, a coercion that would
//! lose information. Stream- and record-level failures live in
//! `pqdif-physical`, protocol failures in `pqdif-logical`.

use thiserror::Error;

use crate::physical_type::PhysicalType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown physical type: {0}")]
    UnknownPhysicalType(u8),

    #[error("unknown element kind: {0}")]
    UnknownElementKind(u8),

    #[error("value type mismatch: expected {expected}, found {found}")]
    ValueTypeMismatch {
        expected: PhysicalType,
        found: PhysicalType,
    },

    #[error("cannot coerce {0} value to {1}")]
    Coercion(PhysicalType, &'static str),

    #[error("buffer too short: needed {needed} bytes, had {available}")]
    BufferTooShort { needed: usize, available: usize },

    #[error("index {index} out of bounds for vector of size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("timestamp out of range: days={days} seconds={seconds}")]
    TimestampOutOfRange { days: u32, seconds: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
