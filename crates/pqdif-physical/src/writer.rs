//! The physical writer: element serialization and record framing.
//!
//! A record body is assembled completely in memory before any byte is
//! appended to the file image, so no partial-record state is ever
//! observable. Serialization is two-pass per collection: first the child
//! headers with precomputed link offsets, then the linked payloads in
//! child order, each zero-padded to a 4-byte boundary.
//!
//! Scalars whose value type is strictly smaller than 8 bytes are embedded
//! in the header's inline payload area; everything else is linked. A tree
//! containing `Element::Error` nodes cannot be serialized: the writer
//! fails instead of producing corrupt output.

use std::path::Path;

use adler32::RollingAdler32;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use pqdif_core::{tags, CollectionElement, Element, ElementKind};

use crate::compression::{self, CompressionAlgorithm, CompressionStyle};
use crate::error::{Error, Result};
use crate::record::{Record, ELEMENT_HEADER_SIZE, RECORD_HEADER_SIZE};

/// Rounds a payload size up to the next 4-byte boundary.
pub fn padded(size: usize) -> usize {
    (size + 3) / 4 * 4
}

/// Whether an element is stored inline in its parent's header area.
fn is_embedded(element: &Element) -> bool {
    matches!(element, Element::Scalar(s) if s.value_type().is_embeddable())
}

/// Size of an element's linked payload, before padding. Embedded scalars
/// and Unknown elements contribute no payload.
pub fn payload_size(element: &Element) -> Result<usize> {
    match element {
        Element::Scalar(s) => Ok(s.value_type().byte_size()),
        Element::Vector(v) => Ok(4 + v.size() * v.value_type().byte_size()),
        Element::Collection(c) => {
            let mut size = 4 + ELEMENT_HEADER_SIZE * c.len();
            for child in c.elements() {
                if !is_embedded(child) {
                    size += padded(payload_size(child)?);
                }
            }
            Ok(size)
        }
        Element::Unknown { .. } => Ok(0),
        Element::Error { tag, .. } => Err(Error::UnserializableElement(*tag)),
    }
}

/// Serializes a collection payload (count, headers, linked payloads) at
/// the current end of `out`. Link offsets are absolute within `out`, which
/// must be the whole record body under construction.
fn serialize_collection(collection: &CollectionElement, out: &mut Vec<u8>) -> Result<()> {
    let base = out.len();
    out.extend_from_slice(&(collection.len() as i32).to_le_bytes());

    // First pass: headers, with link offsets precomputed past the header
    // table and advanced by each non-embedded child's padded payload.
    let mut link = base + 4 + ELEMENT_HEADER_SIZE * collection.len();
    for child in collection.elements() {
        out.extend_from_slice(&child.tag().to_bytes_le());
        match child {
            Element::Scalar(s) if s.value_type().is_embeddable() => {
                out.push(ElementKind::Scalar as u8);
                out.push(s.value_type() as u8);
                out.push(1);
                out.push(0);
                let value = s.get_bytes();
                out.extend_from_slice(&value);
                out.resize(out.len() + 8 - value.len(), 0);
            }
            Element::Scalar(s) => {
                let size = payload_size(child)?;
                write_linked_header(out, ElementKind::Scalar as u8, s.value_type() as u8, link, size);
                link += padded(size);
            }
            Element::Vector(v) => {
                let size = payload_size(child)?;
                write_linked_header(out, ElementKind::Vector as u8, v.value_type() as u8, link, size);
                link += padded(size);
            }
            Element::Collection(_) => {
                let size = payload_size(child)?;
                write_linked_header(out, ElementKind::Collection as u8, 0, link, size);
                link += padded(size);
            }
            Element::Unknown {
                kind, value_type, ..
            } => {
                write_linked_header(out, *kind, *value_type, 0, 0);
            }
            Element::Error { tag, .. } => return Err(Error::UnserializableElement(*tag)),
        }
    }

    // Second pass: linked payloads in child order, each padded to 4 bytes.
    for child in collection.elements() {
        if is_embedded(child) {
            continue;
        }
        match child {
            Element::Scalar(s) => {
                out.extend_from_slice(&s.get_bytes());
                pad_to_boundary(out);
            }
            Element::Vector(v) => {
                out.extend_from_slice(&(v.size() as i32).to_le_bytes());
                out.extend_from_slice(v.bytes());
                pad_to_boundary(out);
            }
            Element::Collection(c) => {
                serialize_collection(c, out)?;
                pad_to_boundary(out);
            }
            Element::Unknown { .. } => {}
            Element::Error { tag, .. } => return Err(Error::UnserializableElement(*tag)),
        }
    }

    Ok(())
}

fn write_linked_header(out: &mut Vec<u8>, kind: u8, value_type: u8, link: usize, size: usize) {
    out.push(kind);
    out.push(value_type);
    out.push(0);
    out.push(0);
    out.extend_from_slice(&(link as i32).to_le_bytes());
    out.extend_from_slice(&(size as i32).to_le_bytes());
}

fn pad_to_boundary(out: &mut Vec<u8>) {
    let target = padded(out.len());
    out.resize(target, 0);
}

/// Serializes a record body to its on-disk (uncompressed) byte form.
pub fn serialize_body(root: &CollectionElement) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    serialize_collection(root, &mut out)?;
    Ok(out)
}

/// Appends records to an in-memory PQDIF file image.
#[derive(Default)]
pub struct Writer {
    buffer: BytesMut,
    compression_algorithm: CompressionAlgorithm,
    compression_style: CompressionStyle,
    record_count: usize,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    /// Configures record-level compression for subsequently written
    /// records. Unsupported pairs (PKZIP, total-file) fail fast.
    pub fn set_compression(
        &mut self,
        algorithm: CompressionAlgorithm,
        style: CompressionStyle,
    ) -> Result<()> {
        compression::ensure_supported(algorithm, style)?;
        self.compression_algorithm = algorithm;
        self.compression_style = style;
        Ok(())
    }

    pub fn compression(&self) -> (CompressionAlgorithm, CompressionStyle) {
        (self.compression_algorithm, self.compression_style)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Serializes and appends one record.
    ///
    /// The record's header is updated in place: body size, checksum, and
    /// the next-record pointer (zero when `last`, otherwise the offset
    /// where the following record will start).
    pub fn write_record(&mut self, record: &mut Record, last: bool) -> Result<()> {
        let mut body = match &record.body {
            Some(root) => serialize_body(root)?,
            None => Vec::new(),
        };

        if self.compression_algorithm == CompressionAlgorithm::Zlib
            && self.compression_style == CompressionStyle::RecordLevel
            && !body.is_empty()
        {
            body = compression::deflate(&body)?;
        }

        let checksum = RollingAdler32::from_buffer(&body).hash();

        record.header.signature = tags::RECORD_SIGNATURE;
        record.header.header_size = RECORD_HEADER_SIZE as i32;
        record.header.body_size = body.len() as i32;
        record.header.checksum = checksum;
        record.header.next_record_position = if last {
            0
        } else {
            (self.buffer.len() + RECORD_HEADER_SIZE + body.len()) as i32
        };
        record.body_checksum = checksum;

        record.header.encode(&mut self.buffer);
        self.buffer.put_slice(&body);
        self.record_count += 1;

        debug!(
            record_type = %record.record_type(),
            body_size = body.len(),
            last,
            "wrote record"
        );
        Ok(())
    }

    /// The finished file image.
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Writes the file image to disk.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path.as_ref(), &self.buffer).await?;
        debug!(bytes = self.buffer.len(), path = %path.as_ref().display(), "saved pqdif file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqdif_core::{PhysicalType, ScalarElement, Value, VectorElement};
    use uuid::Uuid;

    fn tag(n: u8) -> Uuid {
        Uuid::from_u128(n as u128)
    }

    // ---------------------------------------------------------------
    // Size computation
    // ---------------------------------------------------------------

    #[test]
    fn test_padded_rounds_up() {
        assert_eq!(padded(0), 0);
        assert_eq!(padded(1), 4);
        assert_eq!(padded(4), 4);
        assert_eq!(padded(13), 16);
        assert_eq!(padded(16), 16);
    }

    #[test]
    fn test_payload_sizes() {
        let scalar = Element::Scalar(ScalarElement::new(tag(1), PhysicalType::Timestamp));
        assert_eq!(payload_size(&scalar).unwrap(), 12);

        let mut v = VectorElement::new(tag(2), PhysicalType::Real4);
        v.set_size(3);
        assert_eq!(payload_size(&Element::Vector(v)).unwrap(), 16);

        let unknown = Element::Unknown {
            tag: tag(3),
            kind: 9,
            value_type: 0,
        };
        assert_eq!(payload_size(&unknown).unwrap(), 0);
    }

    #[test]
    fn test_collection_payload_size_counts_only_linked_children() {
        let mut col = CollectionElement::new(tag(0));
        // Embedded: u8 scalar.
        col.add(Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(1),
        )));
        // Linked: 3-element Real4 vector, payload 16, already aligned.
        let mut v = VectorElement::new(tag(2), PhysicalType::Real4);
        v.set_size(3);
        col.add(Element::Vector(v));
        let size = payload_size(&Element::Collection(col)).unwrap();
        assert_eq!(size, 4 + 2 * 28 + 16);
    }

    // ---------------------------------------------------------------
    // Serialization layout
    // ---------------------------------------------------------------

    #[test]
    fn test_embedded_scalar_layout() {
        let mut root = CollectionElement::new(tag(0));
        root.add(Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(0x2A),
        )));
        let body = serialize_body(&root).unwrap();
        // count + one header, no linked payload.
        assert_eq!(body.len(), 4 + 28);
        assert_eq!(&body[0..4], &1i32.to_le_bytes());
        let header = &body[4..32];
        assert_eq!(header[16], ElementKind::Scalar as u8);
        assert_eq!(header[17], PhysicalType::UnsignedInteger1 as u8);
        assert_eq!(header[18], 1); // embedded flag
        assert_eq!(header[19], 0); // reserved
        // Inline value, left-justified and zero-padded to 8 bytes.
        assert_eq!(&header[20..28], &[0x2A, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_linked_vector_layout() {
        let mut root = CollectionElement::new(tag(0));
        let mut v = VectorElement::new(tag(1), PhysicalType::Real4);
        v.set_values(&[Value::Real4(1.0), Value::Real4(2.0), Value::Real4(3.0)])
            .unwrap();
        root.add(Element::Vector(v));
        let body = serialize_body(&root).unwrap();
        assert_eq!(body.len(), 4 + 28 + 16);

        let header = &body[4..32];
        assert_eq!(header[16], ElementKind::Vector as u8);
        assert_eq!(header[18], 0); // linked
        let link = i32::from_le_bytes([header[20], header[21], header[22], header[23]]);
        let size = i32::from_le_bytes([header[24], header[25], header[26], header[27]]);
        assert_eq!(link, 32);
        assert_eq!(size, 16);

        // Payload: count then three little-endian floats.
        assert_eq!(&body[32..36], &3i32.to_le_bytes());
        assert_eq!(&body[36..40], &1.0f32.to_le_bytes());
        assert_eq!(&body[44..48], &3.0f32.to_le_bytes());
    }

    #[test]
    fn test_padding_law() {
        // A Char1 vector of 5 bytes has a 9-byte payload, padded to 12.
        let mut root = CollectionElement::new(tag(0));
        let mut v = VectorElement::new(tag(1), PhysicalType::Char1);
        v.set_string("ab");
        root.add(Element::Vector(v));
        root.add(Element::Scalar(ScalarElement::with_value(
            tag(2),
            Value::Real8(1.5),
        )));
        let body = serialize_body(&root).unwrap();
        assert_eq!(body.len() % 4, 0);

        // Vector payload: 4 + 3 = 7, padded to 8; trailing pad byte is zero.
        let vector_payload_start = 4 + 2 * 28;
        assert_eq!(body[vector_payload_start + 7], 0);
        // The Real8 payload starts on the 4-byte boundary after it.
        let real_start = vector_payload_start + 8;
        assert_eq!(real_start % 4, 0);
        assert_eq!(
            &body[real_start..real_start + 8],
            &1.5f64.to_le_bytes()
        );
    }

    #[test]
    fn test_nested_collection_links_match_emission() {
        let mut inner = CollectionElement::new(tag(10));
        inner.add(Element::Scalar(ScalarElement::with_value(
            tag(11),
            Value::Real8(2.0),
        )));
        let mut root = CollectionElement::new(tag(0));
        root.add(Element::Collection(inner));
        let body = serialize_body(&root).unwrap();

        let header = &body[4..32];
        let link =
            i32::from_le_bytes([header[20], header[21], header[22], header[23]]) as usize;
        // The inner collection's count lives exactly at its link.
        assert_eq!(
            &body[link..link + 4],
            &1i32.to_le_bytes()
        );
    }

    #[test]
    fn test_error_element_is_fatal_on_write() {
        let mut root = CollectionElement::new(tag(0));
        root.add(Element::Error {
            tag: tag(1),
            kind: 2,
            value_type: 0,
            cause: "bad".to_string(),
        });
        assert!(matches!(
            serialize_body(&root),
            Err(Error::UnserializableElement(_))
        ));
    }

    // ---------------------------------------------------------------
    // Record framing
    // ---------------------------------------------------------------

    #[test]
    fn test_writer_chains_records() {
        let mut writer = Writer::new();
        let mut first = Record::new(tags::RECORD_TYPE_CONTAINER);
        writer.write_record(&mut first, false).unwrap();
        // Empty collection body: just the zero count.
        assert_eq!(first.header.body_size, 4);
        assert_eq!(first.header.next_record_position, 68);

        let mut second = Record::new(tags::RECORD_TYPE_OBSERVATION);
        writer.write_record(&mut second, true).unwrap();
        assert_eq!(second.header.next_record_position, 0);
        assert_eq!(writer.record_count(), 2);
        assert_eq!(writer.len(), 2 * 64 + 4 + 4);
    }

    #[test]
    fn test_checksum_agreement() {
        let mut writer = Writer::new();
        let mut record = Record::new(tags::RECORD_TYPE_OBSERVATION);
        record
            .body
            .as_mut()
            .unwrap()
            .get_or_add_scalar(tag(1))
            .set_u32(7);
        writer.write_record(&mut record, true).unwrap();
        let data = writer.into_bytes();

        let body = &data[64..64 + record.header.body_size as usize];
        assert_eq!(
            RollingAdler32::from_buffer(body).hash(),
            record.header.checksum
        );
        assert!(record.checksum_matches());
    }

    #[test]
    fn test_unsupported_compression_rejected() {
        let mut writer = Writer::new();
        assert!(writer
            .set_compression(CompressionAlgorithm::Pkzip, CompressionStyle::RecordLevel)
            .is_err());
        assert!(writer
            .set_compression(CompressionAlgorithm::Zlib, CompressionStyle::TotalFile)
            .is_err());
    }
}
