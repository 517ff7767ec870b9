//! Error types for the physical layer.
//!
//! Stream errors (I/O, truncation) are fatal to the current operation.
//! Structural errors behave differently on each side: the parser captures
//! them as `Element::Error` nodes and keeps going, the writer fails fast so
//! a corrupt file is never produced.

use thiserror::Error;
use uuid::Uuid;

use pqdif_core::PhysicalType;

use crate::compression::{CompressionAlgorithm, CompressionStyle};

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of stream at offset {offset}: needed {needed} bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("invalid record body size: {0}")]
    InvalidBodySize(i32),

    #[error("link offset {offset} outside body of {length} bytes")]
    LinkOutOfBounds { offset: i64, length: usize },

    #[error("embedded scalar of type {0} exceeds the 8 inline bytes")]
    OversizedEmbeddedScalar(PhysicalType),

    #[error("invalid collection size: {0}")]
    InvalidCollectionSize(i32),

    #[error("invalid vector size: {0}")]
    InvalidVectorSize(i32),

    #[error("element nesting deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("unknown compression algorithm: {0}")]
    UnknownCompressionAlgorithm(u32),

    #[error("unknown compression style: {0}")]
    UnknownCompressionStyle(u32),

    #[error("unsupported compression: algorithm {algorithm}, style {style}")]
    UnsupportedCompression {
        algorithm: CompressionAlgorithm,
        style: CompressionStyle,
    },

    #[error("compression error: {0}")]
    Compression(String),

    #[error("decompression error: {0}")]
    Decompression(String),

    #[error("cannot serialize error element with tag {0}")]
    UnserializableElement(Uuid),

    #[error(transparent)]
    Core(#[from] pqdif_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
