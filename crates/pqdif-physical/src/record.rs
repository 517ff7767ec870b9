//! Records: the unit of framing in a PQDIF file.
//!
//! ## Header layout (64 bytes, little-endian throughout)
//!
//! ```text
//! 0..15   record_signature       constant per file
//! 16..31  record_type_tag        names the record type
//! 32..35  header_size            i32, always written as 64
//! 36..39  body_size              i32, bytes of body on disk
//! 40..43  next_record_position   i32, absolute offset; 0 for last record
//! 44..47  checksum               u32, Adler-32 of the on-disk body
//! 48..63  reserved               written as zero
//! ```
//!
//! GUIDs in the header use the same mixed-endian layout as element tags.

use std::fmt;

use bytes::BufMut;
use uuid::Uuid;

use pqdif_core::{tags, CollectionElement};

use crate::error::{Error, Result};

/// Size of a record header on disk.
pub const RECORD_HEADER_SIZE: usize = 64;

/// Size of an element header on disk.
pub const ELEMENT_HEADER_SIZE: usize = 28;

/// The record types the logical layer distinguishes, derived from the
/// record-type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    /// First record of every file; holds file-level metadata.
    Container,
    /// Defines the channels a source can observe.
    DataSource,
    /// Settings in force when observations were made.
    MonitorSettings,
    /// One set of measurements.
    Observation,
    /// Reserved space; carries no body.
    Blank,
    /// A record-type tag this codec does not recognize.
    Unknown,
}

impl RecordType {
    /// Classifies a record-type tag.
    pub fn from_tag(tag: Uuid) -> Self {
        if tag == tags::RECORD_TYPE_CONTAINER {
            RecordType::Container
        } else if tag == tags::RECORD_TYPE_DATA_SOURCE {
            RecordType::DataSource
        } else if tag == tags::RECORD_TYPE_MONITOR_SETTINGS {
            RecordType::MonitorSettings
        } else if tag == tags::RECORD_TYPE_OBSERVATION {
            RecordType::Observation
        } else if tag == tags::RECORD_TYPE_BLANK {
            RecordType::Blank
        } else {
            RecordType::Unknown
        }
    }

    /// The tag naming this record type, when there is one.
    pub fn tag(self) -> Option<Uuid> {
        match self {
            RecordType::Container => Some(tags::RECORD_TYPE_CONTAINER),
            RecordType::DataSource => Some(tags::RECORD_TYPE_DATA_SOURCE),
            RecordType::MonitorSettings => Some(tags::RECORD_TYPE_MONITOR_SETTINGS),
            RecordType::Observation => Some(tags::RECORD_TYPE_OBSERVATION),
            RecordType::Blank => Some(tags::RECORD_TYPE_BLANK),
            RecordType::Unknown => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The fixed 64-byte record header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub signature: Uuid,
    pub type_tag: Uuid,
    pub header_size: i32,
    pub body_size: i32,
    pub next_record_position: i32,
    pub checksum: u32,
    pub reserved: [u8; 16],
}

impl RecordHeader {
    /// Builds a header for a record of the given type, fields zeroed until
    /// the writer fills them in.
    pub fn new(type_tag: Uuid) -> Self {
        RecordHeader {
            signature: tags::RECORD_SIGNATURE,
            type_tag,
            header_size: RECORD_HEADER_SIZE as i32,
            body_size: 0,
            next_record_position: 0,
            checksum: 0,
            reserved: [0u8; 16],
        }
    }

    /// The record type named by the type tag.
    pub fn record_type(&self) -> RecordType {
        RecordType::from_tag(self.type_tag)
    }

    /// Encodes the 64-byte on-disk form.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.signature.to_bytes_le());
        buf.put_slice(&self.type_tag.to_bytes_le());
        buf.put_i32_le(self.header_size);
        buf.put_i32_le(self.body_size);
        buf.put_i32_le(self.next_record_position);
        buf.put_u32_le(self.checksum);
        buf.put_slice(&self.reserved);
    }

    /// Decodes the 64-byte on-disk form.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RECORD_HEADER_SIZE {
            return Err(Error::UnexpectedEof {
                offset: 0,
                needed: RECORD_HEADER_SIZE,
            });
        }

        let mut signature = [0u8; 16];
        signature.copy_from_slice(&bytes[0..16]);
        let mut type_tag = [0u8; 16];
        type_tag.copy_from_slice(&bytes[16..32]);
        let mut reserved = [0u8; 16];
        reserved.copy_from_slice(&bytes[48..64]);

        Ok(RecordHeader {
            signature: Uuid::from_bytes_le(signature),
            type_tag: Uuid::from_bytes_le(type_tag),
            header_size: i32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]),
            body_size: i32::from_le_bytes([bytes[36], bytes[37], bytes[38], bytes[39]]),
            next_record_position: i32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]),
            checksum: u32::from_le_bytes([bytes[44], bytes[45], bytes[46], bytes[47]]),
            reserved,
        })
    }
}

/// One record: header plus the decoded body tree.
///
/// `body` is `None` for bodiless records (Blank). `body_checksum` is the
/// Adler-32 actually computed over the on-disk body bytes; for a parsed
/// record it may disagree with `header.checksum`, and callers decide
/// whether that matters.
#[derive(Debug, Clone)]
pub struct Record {
    pub header: RecordHeader,
    pub body: Option<CollectionElement>,
    pub body_checksum: u32,
}

impl Record {
    /// Creates an empty record of the given type with an empty root
    /// collection carrying the record-type tag.
    pub fn new(type_tag: Uuid) -> Self {
        Record {
            header: RecordHeader::new(type_tag),
            body: Some(CollectionElement::new(type_tag)),
            body_checksum: 0,
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.header.record_type()
    }

    /// Whether the stored checksum agrees with the one computed from the
    /// on-disk body bytes.
    pub fn checksum_matches(&self) -> bool {
        self.header.checksum == self.body_checksum
    }
}
