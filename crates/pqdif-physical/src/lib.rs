//! Physical layer of PQDIF (IEEE 1159.3).
//!
//! A PQDIF file is a chain of records. Each record is a 64-byte header
//! followed by a body; the header carries the absolute offset of the next
//! record, an Adler-32 checksum of the on-disk body bytes, and a tag naming
//! the record type. The body, optionally DEFLATE-compressed, decodes to a
//! tree of tagged elements.
//!
//! - [`record`]: headers, record types, and the record value itself.
//! - [`compression`]: the compression style/algorithm pair plus zlib
//!   inflate/deflate of record bodies.
//! - [`parser`]: walks the record chain, verifies checksums, decompresses,
//!   and parses element trees with error recovery and a cycle guard.
//! - [`writer`]: serializes element trees with 4-byte payload alignment and
//!   precomputed link offsets, then frames them into records.
//!
//! Parsing and writing are synchronous over in-memory buffers; file I/O
//! happens only at the open/save boundary.

pub mod compression;
pub mod error;
pub mod parser;
pub mod record;
pub mod writer;

pub use compression::{CompressionAlgorithm, CompressionStyle};
pub use error::{Error, Result};
pub use parser::{ParseIssue, Parser};
pub use record::{Record, RecordHeader, RecordType, ELEMENT_HEADER_SIZE, RECORD_HEADER_SIZE};
pub use writer::Writer;
