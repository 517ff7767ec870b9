//! Record body compression.
//!
//! A container record declares a compression style and algorithm; when the
//! pair is (RecordLevel, Zlib) every subsequent record body is a raw
//! DEFLATE stream (RFC 1951, no zlib header or trailer) of the serialized
//! element tree, and the header's body size and checksum describe the
//! compressed bytes. TotalFile and PKZIP are defined by the standard but
//! unsupported here; configuring either fails fast.

use std::fmt;
use std::io::Read;

use flate2::read::{DeflateDecoder, DeflateEncoder};

use crate::error::{Error, Result};

/// How compression is applied across the file.
///
/// The discriminants are the on-disk UnsignedInteger4 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum CompressionStyle {
    /// Bodies are stored verbatim.
    #[default]
    None = 0,
    /// Each record body is compressed independently.
    RecordLevel = 1,
    /// Everything after the container record is one compressed stream.
    /// Defined by the standard, not supported.
    TotalFile = 2,
}

impl TryFrom<u32> for CompressionStyle {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(CompressionStyle::None),
            1 => Ok(CompressionStyle::RecordLevel),
            2 => Ok(CompressionStyle::TotalFile),
            other => Err(Error::UnknownCompressionStyle(other)),
        }
    }
}

impl fmt::Display for CompressionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Which algorithm compresses record bodies.
///
/// The discriminants are the on-disk UnsignedInteger4 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u32)]
pub enum CompressionAlgorithm {
    /// No compression.
    #[default]
    None = 0,
    /// Raw DEFLATE bodies. The value is named for the library, not the
    /// RFC 1950 wrapper, which record bodies do not carry.
    Zlib = 1,
    /// PKZIP. Defined by the standard, not supported.
    Pkzip = 64,
}

impl TryFrom<u32> for CompressionAlgorithm {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(CompressionAlgorithm::None),
            1 => Ok(CompressionAlgorithm::Zlib),
            64 => Ok(CompressionAlgorithm::Pkzip),
            other => Err(Error::UnknownCompressionAlgorithm(other)),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Returns an error unless the (algorithm, style) pair is one this codec
/// can actually read and write.
pub fn ensure_supported(
    algorithm: CompressionAlgorithm,
    style: CompressionStyle,
) -> Result<()> {
    match (algorithm, style) {
        (CompressionAlgorithm::Pkzip, _) | (_, CompressionStyle::TotalFile) => {
            Err(Error::UnsupportedCompression { algorithm, style })
        }
        _ => Ok(()),
    }
}

/// Compresses a record body as a raw DEFLATE stream.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(data, flate2::Compression::default());
    let mut out = Vec::new();
    encoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Compression(e.to_string()))?;
    Ok(out)
}

/// Decompresses a raw DEFLATE record body.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_discriminants() {
        assert_eq!(CompressionStyle::None as u32, 0);
        assert_eq!(CompressionStyle::RecordLevel as u32, 1);
        assert_eq!(CompressionStyle::TotalFile as u32, 2);
        assert!(CompressionStyle::try_from(3).is_err());
    }

    #[test]
    fn test_algorithm_discriminants() {
        assert_eq!(CompressionAlgorithm::None as u32, 0);
        assert_eq!(CompressionAlgorithm::Zlib as u32, 1);
        assert_eq!(CompressionAlgorithm::Pkzip as u32, 64);
        assert!(CompressionAlgorithm::try_from(2).is_err());
    }

    #[test]
    fn test_unsupported_pairs_rejected() {
        assert!(ensure_supported(CompressionAlgorithm::Pkzip, CompressionStyle::None).is_err());
        assert!(
            ensure_supported(CompressionAlgorithm::Zlib, CompressionStyle::TotalFile).is_err()
        );
        assert!(
            ensure_supported(CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel).is_ok()
        );
        assert!(ensure_supported(CompressionAlgorithm::None, CompressionStyle::None).is_ok());
    }

    #[test]
    fn test_deflate_roundtrip() {
        let body = b"power quality data interchange format".repeat(50);
        let compressed = deflate(&body).unwrap();
        assert!(compressed.len() < body.len());
        assert_eq!(inflate(&compressed).unwrap(), body);
    }

    #[test]
    fn test_streams_are_raw_deflate() {
        // A zlib-wrapped stream (RFC 1950: 0x78 0x9C header, Adler-32
        // trailer; this one is "hello") must be refused, not unwrapped.
        let wrapped = [
            0x78, 0x9C, 0xCB, 0x48, 0xCD, 0xC9, 0xC9, 0x07, 0x00, 0x06, 0x2C, 0x02, 0x15,
        ];
        assert!(inflate(&wrapped).is_err());
    }

    #[test]
    fn test_inflate_garbage_fails() {
        assert!(inflate(&[0xDE, 0xAD, 0xBE, 0xEF]).is_err());
    }
}
