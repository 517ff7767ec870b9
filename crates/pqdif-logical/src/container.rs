//! The container record: file-level metadata.
//!
//! Every PQDIF file opens with exactly one container record. It names the
//! file, stamps its creation time, declares the writer and compatibility
//! versions, and declares how the bodies of all subsequent records are
//! compressed.

use chrono::Utc;

use pqdif_core::{tags, PhysicalType, Timestamp, Value};
use pqdif_physical::{CompressionAlgorithm, CompressionStyle, Record, RecordType};

use crate::error::{Error, Result};
use crate::{record_body, record_body_mut};

/// Indices into the shared four-element version vector.
const WRITER_MAJOR: usize = 0;
const WRITER_MINOR: usize = 1;
const COMPATIBLE_MAJOR: usize = 2;
const COMPATIBLE_MINOR: usize = 3;

/// Typed view over a container record.
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    record: Record,
}

impl ContainerRecord {
    /// Creates a container with the conventional defaults: writer version
    /// 1.5, compatible version 1.0, a timestamped file name, and a
    /// creation time of now.
    pub fn new() -> Self {
        let mut container = ContainerRecord {
            record: Record::new(tags::RECORD_TYPE_CONTAINER),
        };
        container.set_writer_version(1, 5);
        container.set_compatible_version(1, 0);
        let now = Utc::now();
        container.set_file_name(&now.format("%Y-%m-%d_%H.%M.%S.pqd").to_string());
        container.set_creation(Timestamp::now());
        container
    }

    /// Wraps a parsed record, which must be a container with a body.
    pub fn from_record(record: Record) -> Result<Self> {
        if record.record_type() != RecordType::Container {
            return Err(Error::UnexpectedRecordType {
                expected: RecordType::Container,
                found: record.record_type(),
            });
        }
        if record.body.is_none() {
            return Err(Error::MissingBody);
        }
        Ok(ContainerRecord { record })
    }

    /// The underlying physical record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    fn version_component(&self, index: usize) -> Result<u32> {
        let vector = record_body(&self.record)
            .get_vector_by_tag(tags::VERSION_INFO)
            .ok_or(Error::MissingElement {
                tag: tags::VERSION_INFO,
            })?;
        Ok(vector.get(index)?.as_u32()?)
    }

    fn set_version_component(&mut self, index: usize, value: u32) {
        let vector = record_body_mut(&mut self.record).get_or_add_vector(tags::VERSION_INFO);
        if vector.value_type() != PhysicalType::UnsignedInteger4 || vector.size() != 4 {
            vector.set_value_type(PhysicalType::UnsignedInteger4);
            vector.set_size(4);
        }
        // Size and type are fixed just above; set cannot fail.
        let _ = vector.set(index, Value::UnsignedInteger4(value));
    }

    pub fn writer_major(&self) -> Result<u32> {
        self.version_component(WRITER_MAJOR)
    }

    pub fn writer_minor(&self) -> Result<u32> {
        self.version_component(WRITER_MINOR)
    }

    pub fn compatible_major(&self) -> Result<u32> {
        self.version_component(COMPATIBLE_MAJOR)
    }

    pub fn compatible_minor(&self) -> Result<u32> {
        self.version_component(COMPATIBLE_MINOR)
    }

    pub fn set_writer_version(&mut self, major: u32, minor: u32) {
        self.set_version_component(WRITER_MAJOR, major);
        self.set_version_component(WRITER_MINOR, minor);
    }

    pub fn set_compatible_version(&mut self, major: u32, minor: u32) {
        self.set_version_component(COMPATIBLE_MAJOR, major);
        self.set_version_component(COMPATIBLE_MINOR, minor);
    }

    /// The file name recorded when the file was written.
    pub fn file_name(&self) -> Result<String> {
        let vector = record_body(&self.record)
            .get_vector_by_tag(tags::FILE_NAME)
            .ok_or(Error::MissingElement {
                tag: tags::FILE_NAME,
            })?;
        Ok(vector.get_string()?)
    }

    pub fn set_file_name(&mut self, name: &str) {
        record_body_mut(&mut self.record)
            .get_or_add_vector(tags::FILE_NAME)
            .set_string(name);
    }

    /// When the file was created.
    pub fn creation(&self) -> Result<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::CREATION)
            .ok_or(Error::MissingElement {
                tag: tags::CREATION,
            })?
            .get_timestamp()
            .map_err(Error::from)
    }

    pub fn set_creation(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::CREATION)
            .set_timestamp(timestamp);
    }

    /// Declared compression style; absent means none.
    pub fn compression_style(&self) -> Result<CompressionStyle> {
        match record_body(&self.record).get_scalar_by_tag(tags::COMPRESSION_STYLE) {
            Some(scalar) => Ok(CompressionStyle::try_from(scalar.get_u32()?)?),
            None => Ok(CompressionStyle::None),
        }
    }

    /// Declared compression algorithm; absent means none.
    pub fn compression_algorithm(&self) -> Result<CompressionAlgorithm> {
        match record_body(&self.record).get_scalar_by_tag(tags::COMPRESSION_ALGORITHM) {
            Some(scalar) => Ok(CompressionAlgorithm::try_from(scalar.get_u32()?)?),
            None => Ok(CompressionAlgorithm::None),
        }
    }

    /// Declares how every record after this one is compressed.
    pub fn set_compression(
        &mut self,
        algorithm: CompressionAlgorithm,
        style: CompressionStyle,
    ) -> Result<()> {
        pqdif_physical::compression::ensure_supported(algorithm, style)?;
        let body = record_body_mut(&mut self.record);
        body.get_or_add_scalar(tags::COMPRESSION_ALGORITHM)
            .set_u32(algorithm as u32);
        body.get_or_add_scalar(tags::COMPRESSION_STYLE)
            .set_u32(style as u32);
        Ok(())
    }
}

impl Default for ContainerRecord {
    fn default() -> Self {
        ContainerRecord::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_conventional_defaults() {
        let container = ContainerRecord::new();
        assert_eq!(container.writer_major().unwrap(), 1);
        assert_eq!(container.writer_minor().unwrap(), 5);
        assert_eq!(container.compatible_major().unwrap(), 1);
        assert_eq!(container.compatible_minor().unwrap(), 0);
        assert!(container.file_name().unwrap().ends_with(".pqd"));
        assert!(container.creation().unwrap().days > 0);
        assert_eq!(
            container.compression_style().unwrap(),
            CompressionStyle::None
        );
        assert_eq!(
            container.compression_algorithm().unwrap(),
            CompressionAlgorithm::None
        );
    }

    #[test]
    fn test_version_components_share_one_vector() {
        let mut container = ContainerRecord::new();
        container.set_writer_version(2, 7);
        container.set_compatible_version(1, 3);
        let body = record_body(container.record());
        let vector = body.get_vector_by_tag(tags::VERSION_INFO).unwrap();
        assert_eq!(vector.size(), 4);
        assert_eq!(vector.get(0).unwrap(), Value::UnsignedInteger4(2));
        assert_eq!(vector.get(1).unwrap(), Value::UnsignedInteger4(7));
        assert_eq!(vector.get(2).unwrap(), Value::UnsignedInteger4(1));
        assert_eq!(vector.get(3).unwrap(), Value::UnsignedInteger4(3));
    }

    #[test]
    fn test_file_name_round_trip() {
        let mut container = ContainerRecord::new();
        container.set_file_name("a.pqd");
        assert_eq!(container.file_name().unwrap(), "a.pqd");
    }

    #[test]
    fn test_set_compression_rejects_unsupported() {
        let mut container = ContainerRecord::new();
        assert!(container
            .set_compression(CompressionAlgorithm::Pkzip, CompressionStyle::RecordLevel)
            .is_err());
        container
            .set_compression(CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel)
            .unwrap();
        assert_eq!(
            container.compression_algorithm().unwrap(),
            CompressionAlgorithm::Zlib
        );
        assert_eq!(
            container.compression_style().unwrap(),
            CompressionStyle::RecordLevel
        );
    }

    #[test]
    fn test_from_record_rejects_other_types() {
        let record = Record::new(tags::RECORD_TYPE_OBSERVATION);
        assert!(matches!(
            ContainerRecord::from_record(record),
            Err(Error::UnexpectedRecordType { .. })
        ));
    }
}
