//! The physical parser: record iteration with recovery.
//!
//! The parser walks the chain of records through an in-memory copy of the
//! file. Record headers are trusted only as far as they can be bounds-
//! checked: a next-record pointer that runs off the end, points backwards
//! to an offset already visited, or is zero ends iteration instead of
//! looping or crashing.
//!
//! Inside a record body, element parsing is resilient by design. Each
//! element header is a fixed 28 bytes, so when one element's payload is
//! malformed the parser records the failure, plants an `Element::Error`
//! placeholder carrying the captured tag/kind/value-type, and resumes at
//! the next sibling. Failures accumulate against an error budget (default
//! 100); exhausting the budget halts iteration as if the file had ended.
//!
//! ## Compression
//!
//! The algorithm/style pair is sticky per parser and initialized from the
//! container record by the logical layer before later records are parsed.
//! The container itself is always stored uncompressed.

use std::collections::HashSet;
use std::path::Path;

use adler32::RollingAdler32;
use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use pqdif_core::{
    CollectionElement, Element, ElementKind, PhysicalType, ScalarElement, VectorElement,
};

use crate::compression::{self, CompressionAlgorithm, CompressionStyle};
use crate::error::{Error, Result};
use crate::record::{Record, RecordHeader, ELEMENT_HEADER_SIZE, RECORD_HEADER_SIZE};

/// Default number of non-fatal parse failures tolerated before iteration
/// halts. Negative disables the budget.
pub const DEFAULT_MAX_ERROR_COUNT: i32 = 100;

/// Maximum element nesting depth. A link pointing back into an enclosing
/// collection would otherwise recurse without bound.
const MAX_NESTING: usize = 64;

/// A non-fatal failure captured while parsing an element tree.
#[derive(Debug, Clone)]
pub struct ParseIssue {
    /// File offset of the record whose body the failure occurred in.
    pub record_offset: usize,
    /// Offset of the failed element header within the (decompressed) body.
    pub element_offset: usize,
    /// Tag of the failed element, when the header was readable.
    pub tag: Option<Uuid>,
    /// Human-readable cause.
    pub cause: String,
}

/// Reads records from an in-memory PQDIF file image.
pub struct Parser {
    data: Bytes,
    position: usize,
    visited: HashSet<usize>,
    compression_algorithm: CompressionAlgorithm,
    compression_style: CompressionStyle,
    errors: Vec<ParseIssue>,
    max_error_count: i32,
    exhausted: bool,
}

impl Parser {
    /// Creates a parser over a complete file image.
    pub fn new(data: Bytes) -> Self {
        Parser {
            data,
            position: 0,
            visited: HashSet::new(),
            compression_algorithm: CompressionAlgorithm::None,
            compression_style: CompressionStyle::None,
            errors: Vec::new(),
            max_error_count: DEFAULT_MAX_ERROR_COUNT,
            exhausted: false,
        }
    }

    /// Reads a file from disk and parses it in memory.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        debug!(bytes = data.len(), path = %path.as_ref().display(), "opened pqdif file");
        Ok(Parser::new(Bytes::from(data)))
    }

    /// Total length of the underlying file image.
    pub fn stream_length(&self) -> usize {
        self.data.len()
    }

    /// Non-fatal failures accumulated so far.
    pub fn errors(&self) -> &[ParseIssue] {
        &self.errors
    }

    /// Sets the error budget. Negative disables it.
    pub fn set_max_error_count(&mut self, max: i32) {
        self.max_error_count = max;
    }

    /// The sticky compression settings applied to record bodies.
    pub fn compression(&self) -> (CompressionAlgorithm, CompressionStyle) {
        (self.compression_algorithm, self.compression_style)
    }

    /// Configures the sticky compression settings. Unsupported pairs
    /// (PKZIP, total-file) fail fast.
    pub fn set_compression(
        &mut self,
        algorithm: CompressionAlgorithm,
        style: CompressionStyle,
    ) -> Result<()> {
        compression::ensure_supported(algorithm, style)?;
        debug!(%algorithm, %style, "compression settings changed");
        self.compression_algorithm = algorithm;
        self.compression_style = style;
        Ok(())
    }

    /// Repositions to offset 0 and clears all iteration state, including
    /// the cycle guard, the error list, and the compression settings.
    pub fn reset(&mut self) {
        self.position = 0;
        self.visited.clear();
        self.errors.clear();
        self.exhausted = false;
        self.compression_algorithm = CompressionAlgorithm::None;
        self.compression_style = CompressionStyle::None;
    }

    /// Whether another call to [`next_record`](Self::next_record) can yield
    /// a record.
    pub fn has_next(&self) -> bool {
        !self.exhausted && !self.budget_exhausted() && self.position < self.data.len()
    }

    /// Reads the record at the current position and advances the cursor
    /// along the next-record chain.
    ///
    /// Returns `Ok(None)` once the chain ends: a next pointer that is zero
    /// or negative, past the end of the stream, or already visited, or an
    /// exhausted error budget.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        if !self.has_next() {
            return Ok(None);
        }

        let offset = self.position;
        if offset + RECORD_HEADER_SIZE > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset,
                needed: RECORD_HEADER_SIZE,
            });
        }

        let header = RecordHeader::decode(&self.data[offset..offset + RECORD_HEADER_SIZE])?;
        if header.signature != pqdif_core::tags::RECORD_SIGNATURE {
            warn!(offset, signature = %header.signature, "record signature mismatch");
        }
        if header.header_size != RECORD_HEADER_SIZE as i32 {
            warn!(offset, header_size = header.header_size, "unusual header size");
        }
        if header.body_size < 0 {
            return Err(Error::InvalidBodySize(header.body_size));
        }

        let body_start = offset + RECORD_HEADER_SIZE;
        let body_end = body_start + header.body_size as usize;
        if body_end > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset: body_start,
                needed: header.body_size as usize,
            });
        }
        let raw_body = &self.data[body_start..body_end];

        // Checksum covers the bytes as stored, before any decompression.
        let body_checksum = RollingAdler32::from_buffer(raw_body).hash();

        let decompress = self.compression_algorithm == CompressionAlgorithm::Zlib
            && self.compression_style != CompressionStyle::None
            && !raw_body.is_empty();
        let body_bytes;
        let body_slice: &[u8] = if decompress {
            body_bytes = compression::inflate(raw_body)?;
            &body_bytes
        } else {
            raw_body
        };

        let body = if body_slice.is_empty() {
            None
        } else {
            let budget = self.remaining_budget();
            let mut tree = TreeParser::new(body_slice, offset, budget);
            let mut root = tree.parse_collection(0, Uuid::nil(), 0)?;
            self.errors.extend(tree.issues);
            // The root collection has no stored tag; it takes the record's.
            root.tag = header.type_tag;
            Some(root)
        };

        // Cycle guard: never return to an offset already yielded.
        self.visited.insert(offset);
        let next = header.next_record_position;
        if next <= 0
            || next as usize >= self.data.len()
            || self.visited.contains(&(next as usize))
        {
            self.exhausted = true;
        } else {
            self.position = next as usize;
        }

        Ok(Some(Record {
            header,
            body,
            body_checksum,
        }))
    }

    fn budget_exhausted(&self) -> bool {
        self.max_error_count >= 0 && self.errors.len() > self.max_error_count as usize
    }

    fn remaining_budget(&self) -> Option<usize> {
        if self.max_error_count < 0 {
            None
        } else {
            Some((self.max_error_count as usize + 1).saturating_sub(self.errors.len()))
        }
    }
}

/// Parses the element tree of one (decompressed) record body.
struct TreeParser<'a> {
    body: &'a [u8],
    record_offset: usize,
    issues: Vec<ParseIssue>,
    /// Issues still allowed before parsing halts; `None` is unlimited.
    budget: Option<usize>,
    halted: bool,
}

impl<'a> TreeParser<'a> {
    fn new(body: &'a [u8], record_offset: usize, budget: Option<usize>) -> Self {
        TreeParser {
            body,
            record_offset,
            issues: Vec::new(),
            budget,
            halted: false,
        }
    }

    /// Parses a collection payload (child count + element headers) at the
    /// given body offset.
    fn parse_collection(
        &mut self,
        at: usize,
        tag: Uuid,
        depth: usize,
    ) -> Result<CollectionElement> {
        if depth > MAX_NESTING {
            return Err(Error::NestingTooDeep(MAX_NESTING));
        }
        if at + 4 > self.body.len() {
            return Err(Error::UnexpectedEof {
                offset: at,
                needed: 4,
            });
        }
        let count = i32::from_le_bytes([
            self.body[at],
            self.body[at + 1],
            self.body[at + 2],
            self.body[at + 3],
        ]);
        if count < 0 {
            return Err(Error::InvalidCollectionSize(count));
        }

        let mut collection = CollectionElement::new(tag);
        collection.set_read_size(count as usize);

        for index in 0..count as usize {
            if self.halted {
                break;
            }
            let header_at = at + 4 + ELEMENT_HEADER_SIZE * index;
            if header_at + ELEMENT_HEADER_SIZE > self.body.len() {
                // Truncated stream: the declared read-size outruns the
                // buffer. Stop here; read_size keeps the declared count.
                self.record_issue(header_at, None, "element header past end of body");
                break;
            }
            match self.parse_element(header_at, depth) {
                Ok(element) => collection.add(element),
                Err((tag, kind, value_type, cause)) => {
                    let cause = cause.to_string();
                    self.record_issue(header_at, Some(tag), &cause);
                    collection.add(Element::Error {
                        tag,
                        kind,
                        value_type,
                        cause,
                    });
                    // Resume at the next sibling: headers have a fixed
                    // stride, so the loop index is the recovery point.
                }
            }
        }

        Ok(collection)
    }

    /// Parses one 28-byte element header and its payload.
    ///
    /// On failure, returns the captured tag/kind/value-type so the caller
    /// can plant an `Element::Error` in the tree.
    fn parse_element(
        &mut self,
        at: usize,
        depth: usize,
    ) -> std::result::Result<Element, (Uuid, u8, u8, Error)> {
        let mut tag_bytes = [0u8; 16];
        tag_bytes.copy_from_slice(&self.body[at..at + 16]);
        let tag = Uuid::from_bytes_le(tag_bytes);
        let kind_raw = self.body[at + 16];
        let value_type_raw = self.body[at + 17];
        let embedded = self.body[at + 18] != 0;
        // Byte at + 19 is reserved.

        let fail = |e: Error| (tag, kind_raw, value_type_raw, e);

        let kind = match ElementKind::try_from(kind_raw) {
            Ok(kind) => kind,
            // Not an error: unrecognized kinds survive as Unknown nodes.
            Err(_) => {
                return Ok(Element::Unknown {
                    tag,
                    kind: kind_raw,
                    value_type: value_type_raw,
                })
            }
        };

        if embedded && kind == ElementKind::Scalar {
            let value_type = PhysicalType::try_from(value_type_raw)
                .map_err(|e| fail(e.into()))?;
            if value_type.byte_size() > 8 {
                return Err(fail(Error::OversizedEmbeddedScalar(value_type)));
            }
            let mut scalar = ScalarElement::new(tag, value_type);
            scalar
                .set_bytes(&self.body[at + 20..at + 28])
                .map_err(|e| fail(e.into()))?;
            return Ok(Element::Scalar(scalar));
        }

        // Linked payload: 4-byte absolute offset within the body, then a
        // 4-byte stored size (recomputed from content on read).
        let link = i32::from_le_bytes([
            self.body[at + 20],
            self.body[at + 21],
            self.body[at + 22],
            self.body[at + 23],
        ]);
        if link < 0 || link as usize >= self.body.len() {
            return Err(fail(Error::LinkOutOfBounds {
                offset: i64::from(link),
                length: self.body.len(),
            }));
        }
        let link = link as usize;

        match kind {
            ElementKind::Collection => self
                .parse_collection(link, tag, depth + 1)
                .map(Element::Collection)
                .map_err(fail),
            ElementKind::Scalar => {
                let value_type = PhysicalType::try_from(value_type_raw)
                    .map_err(|e| fail(e.into()))?;
                let size = value_type.byte_size();
                if link + size > self.body.len() {
                    return Err(fail(Error::UnexpectedEof {
                        offset: link,
                        needed: size,
                    }));
                }
                let mut scalar = ScalarElement::new(tag, value_type);
                scalar
                    .set_bytes(&self.body[link..link + size])
                    .map_err(|e| fail(e.into()))?;
                Ok(Element::Scalar(scalar))
            }
            ElementKind::Vector => {
                let value_type = PhysicalType::try_from(value_type_raw)
                    .map_err(|e| fail(e.into()))?;
                if link + 4 > self.body.len() {
                    return Err(fail(Error::UnexpectedEof {
                        offset: link,
                        needed: 4,
                    }));
                }
                let size = i32::from_le_bytes([
                    self.body[link],
                    self.body[link + 1],
                    self.body[link + 2],
                    self.body[link + 3],
                ]);
                if size < 0 {
                    return Err(fail(Error::InvalidVectorSize(size)));
                }
                let size = size as usize;
                let total = size * value_type.byte_size();
                if link + 4 + total > self.body.len() {
                    return Err(fail(Error::UnexpectedEof {
                        offset: link + 4,
                        needed: total,
                    }));
                }
                let data = self.body[link + 4..link + 4 + total].to_vec();
                VectorElement::from_raw(tag, value_type, size, data)
                    .map(Element::Vector)
                    .map_err(|e| fail(e.into()))
            }
        }
    }

    fn record_issue(&mut self, element_offset: usize, tag: Option<Uuid>, cause: &str) {
        warn!(
            record_offset = self.record_offset,
            element_offset,
            cause,
            "recovered from malformed element"
        );
        self.issues.push(ParseIssue {
            record_offset: self.record_offset,
            element_offset,
            tag,
            cause: cause.to_string(),
        });
        if let Some(budget) = self.budget {
            if self.issues.len() >= budget {
                self.halted = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqdif_core::tags;

    use crate::writer::Writer;
    use pqdif_core::Value;

    fn tag(n: u8) -> Uuid {
        Uuid::from_u128(n as u128)
    }

    /// A single observation record whose body holds the given elements.
    fn file_with_elements(elements: Vec<Element>) -> Bytes {
        let mut record = Record::new(tags::RECORD_TYPE_OBSERVATION);
        let body = record.body.as_mut().unwrap();
        for element in elements {
            body.add(element);
        }
        let mut writer = Writer::new();
        writer.write_record(&mut record, true).unwrap();
        writer.into_bytes()
    }

    #[test]
    fn test_parse_single_record_file() {
        let data = file_with_elements(vec![Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(0x2A),
        ))]);
        let mut parser = Parser::new(data);
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.record_type(), crate::record::RecordType::Observation);
        assert!(record.checksum_matches());
        let body = record.body.unwrap();
        assert_eq!(body.tag, tags::RECORD_TYPE_OBSERVATION);
        assert_eq!(
            body.get_scalar_by_tag(tag(1)).unwrap().get().unwrap(),
            Value::UnsignedInteger1(0x2A)
        );
        assert!(parser.next_record().unwrap().is_none());
        assert!(parser.errors().is_empty());
    }

    #[test]
    fn test_unknown_kind_byte_becomes_unknown_element() {
        let data = file_with_elements(vec![Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(1),
        ))]);
        let mut raw = data.to_vec();
        // Element kind byte of the first (only) child: body starts at 64,
        // count occupies 4 bytes, tag the next 16.
        raw[64 + 4 + 16] = 0x77;
        let mut parser = Parser::new(Bytes::from(raw));
        let record = parser.next_record().unwrap().unwrap();
        let body = record.body.unwrap();
        assert!(matches!(
            body.elements()[0],
            Element::Unknown { kind: 0x77, .. }
        ));
        // Unknown is a preserved node, not a parse failure.
        assert!(parser.errors().is_empty());
    }

    #[test]
    fn test_bad_value_type_recovers_with_error_element() {
        let data = file_with_elements(vec![
            Element::Scalar(ScalarElement::with_value(tag(1), Value::UnsignedInteger1(1))),
            Element::Scalar(ScalarElement::with_value(tag(2), Value::UnsignedInteger1(2))),
        ]);
        let mut raw = data.to_vec();
        // Corrupt the value-type byte of the first child.
        raw[64 + 4 + 17] = 0xEE;
        let mut parser = Parser::new(Bytes::from(raw));
        let record = parser.next_record().unwrap().unwrap();
        let body = record.body.unwrap();
        assert_eq!(body.len(), 2);
        assert!(body.elements()[0].is_error());
        // Parsing resumed at the sibling.
        assert_eq!(
            body.elements()[1].as_scalar().unwrap().get().unwrap(),
            Value::UnsignedInteger1(2)
        );
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(parser.errors()[0].tag, Some(tag(1)));
    }

    #[test]
    fn test_link_out_of_bounds_recovers() {
        let mut vector = VectorElement::new(tag(1), PhysicalType::Real4);
        vector
            .set_values(&[Value::Real4(1.0), Value::Real4(2.0)])
            .unwrap();
        let data = file_with_elements(vec![Element::Vector(vector)]);
        let mut raw = data.to_vec();
        // Overwrite the link offset with a huge value.
        let link_at = 64 + 4 + 20;
        raw[link_at..link_at + 4].copy_from_slice(&0x7FFF_FFFFi32.to_le_bytes());
        let mut parser = Parser::new(Bytes::from(raw));
        let record = parser.next_record().unwrap().unwrap();
        assert!(record.body.unwrap().elements()[0].is_error());
        assert_eq!(parser.errors().len(), 1);
    }

    #[test]
    fn test_error_budget_halts_iteration() {
        // Three malformed children, budget of one.
        let data = file_with_elements(vec![
            Element::Scalar(ScalarElement::with_value(tag(1), Value::UnsignedInteger1(1))),
            Element::Scalar(ScalarElement::with_value(tag(2), Value::UnsignedInteger1(2))),
            Element::Scalar(ScalarElement::with_value(tag(3), Value::UnsignedInteger1(3))),
        ]);
        let mut raw = data.to_vec();
        for index in 0..3 {
            raw[64 + 4 + 28 * index + 17] = 0xEE;
        }
        let mut parser = Parser::new(Bytes::from(raw));
        parser.set_max_error_count(0);
        let record = parser.next_record().unwrap().unwrap();
        // Budget 0 allows a single captured error, then parsing halts.
        let body = record.body.unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body.read_size(), 3);
        assert_eq!(parser.errors().len(), 1);
        // Iteration is over even though the chain could continue.
        assert!(!parser.has_next());
        assert!(parser.next_record().unwrap().is_none());
    }

    #[test]
    fn test_negative_budget_disables_halting() {
        let data = file_with_elements(vec![
            Element::Scalar(ScalarElement::with_value(tag(1), Value::UnsignedInteger1(1))),
            Element::Scalar(ScalarElement::with_value(tag(2), Value::UnsignedInteger1(2))),
        ]);
        let mut raw = data.to_vec();
        for index in 0..2 {
            raw[64 + 4 + 28 * index + 17] = 0xEE;
        }
        let mut parser = Parser::new(Bytes::from(raw));
        parser.set_max_error_count(-1);
        let record = parser.next_record().unwrap().unwrap();
        assert_eq!(record.body.unwrap().len(), 2);
        assert_eq!(parser.errors().len(), 2);
    }

    #[test]
    fn test_reset_clears_state() {
        let data = file_with_elements(vec![Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(1),
        ))]);
        let mut parser = Parser::new(data);
        parser.next_record().unwrap().unwrap();
        assert!(!parser.has_next());
        parser.reset();
        assert!(parser.has_next());
        assert!(parser.next_record().unwrap().is_some());
    }

    #[test]
    fn test_truncated_body_is_fatal() {
        let data = file_with_elements(vec![Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::UnsignedInteger1(1),
        ))]);
        let truncated = data.slice(0..70);
        let mut parser = Parser::new(truncated);
        assert!(matches!(
            parser.next_record(),
            Err(Error::UnexpectedEof { .. })
        ));
    }
}
