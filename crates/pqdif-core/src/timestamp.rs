//! PQDIF timestamps.
//!
//! A timestamp is stored on disk as 12 bytes: a u32 count of days since
//! 1900-01-01 followed by an f64 count of seconds since midnight. The
//! standard states the day offset between 1900-01-01 and the Unix epoch as
//! 25569, which is two days too many (the true difference is 25567), and
//! files in the field are written against the wrong constant. Interoperable
//! codecs therefore subtract two days when decoding and add two days when
//! encoding; both directions are applied here, exactly once each.

use bytes::BufMut;
use chrono::{DateTime, Timelike, Utc};

use crate::error::{Error, Result};

/// Days between 1900-01-01 and the Unix epoch.
const DAYS_TO_UNIX_EPOCH: i64 = 25_567;

/// Day correction compensating for the standard's off-by-two epoch offset.
const DAY_CORRECTION: i64 = 2;

const SECONDS_PER_DAY: i64 = 86_400;

/// A PQDIF timestamp in its on-disk representation.
///
/// `days` and `seconds` hold exactly what the file stores; conversion to
/// and from calendar time goes through [`Timestamp::to_datetime`] and
/// [`Timestamp::from_datetime`], which apply the two-day correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp {
    /// Days since 1900-01-01, as stored (includes the +2 correction).
    pub days: u32,
    /// Seconds since midnight, including the fractional part.
    pub seconds: f64,
}

impl Timestamp {
    /// Size of the on-disk representation in bytes.
    pub const BYTE_SIZE: usize = 12;

    /// Builds a timestamp from a UTC instant, applying the +2 day
    /// correction. Instants before 1900-01-01 are not representable.
    pub fn from_datetime(dt: DateTime<Utc>) -> Result<Self> {
        let unix_seconds = dt.timestamp();
        let days_since_unix = unix_seconds.div_euclid(SECONDS_PER_DAY);
        let day_seconds =
            unix_seconds.rem_euclid(SECONDS_PER_DAY) as f64 + f64::from(dt.nanosecond()) / 1e9;

        let days = days_since_unix + DAYS_TO_UNIX_EPOCH + DAY_CORRECTION;
        if days < 0 || days > i64::from(u32::MAX) {
            return Err(Error::TimestampOutOfRange {
                days: 0,
                seconds: day_seconds,
            });
        }

        Ok(Timestamp {
            days: days as u32,
            seconds: day_seconds,
        })
    }

    /// The current instant.
    pub fn now() -> Self {
        // Utc::now() is always representable: it is well past 1900.
        Self::from_datetime(Utc::now()).unwrap_or(Timestamp {
            days: (DAYS_TO_UNIX_EPOCH + DAY_CORRECTION) as u32,
            seconds: 0.0,
        })
    }

    /// Converts back to a UTC instant, applying the −2 day correction.
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        // One extra second of headroom for leap-second-bearing writers.
        if !self.seconds.is_finite() || self.seconds < 0.0 || self.seconds >= 86_401.0 {
            return Err(Error::TimestampOutOfRange {
                days: self.days,
                seconds: self.seconds,
            });
        }

        let days = i64::from(self.days) - DAY_CORRECTION - DAYS_TO_UNIX_EPOCH;
        let whole = self.seconds.trunc();
        let mut nanos = ((self.seconds - whole) * 1e9).round() as u32;
        let mut seconds = days * SECONDS_PER_DAY + whole as i64;
        if nanos >= 1_000_000_000 {
            nanos -= 1_000_000_000;
            seconds += 1;
        }

        DateTime::<Utc>::from_timestamp(seconds, nanos).ok_or(Error::TimestampOutOfRange {
            days: self.days,
            seconds: self.seconds,
        })
    }

    /// Encodes the 12-byte little-endian representation.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.days);
        buf.put_f64_le(self.seconds);
    }

    /// Decodes the 12-byte little-endian representation.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::BYTE_SIZE {
            return Err(Error::BufferTooShort {
                needed: Self::BYTE_SIZE,
                available: bytes.len(),
            });
        }
        let days = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let seconds = f64::from_le_bytes([
            bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11],
        ]);
        Ok(Timestamp { days, seconds })
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Ok(dt) => write!(f, "{}", dt.to_rfc3339()),
            Err(_) => write!(f, "days={} seconds={}", self.days, self.seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use chrono::TimeZone;

    #[test]
    fn test_unix_epoch_is_day_25569() {
        // The wrong-by-two constant the standard mandates on disk.
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let ts = Timestamp::from_datetime(epoch).unwrap();
        assert_eq!(ts.days, 25_569);
        assert_eq!(ts.seconds, 0.0);
    }

    #[test]
    fn test_pqdif_epoch_round_trip() {
        let t = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let ts = Timestamp::from_datetime(t).unwrap();
        assert_eq!(ts.days, 2);
        assert_eq!(ts.to_datetime().unwrap(), t);
    }

    #[test]
    fn test_before_1900_rejected() {
        let t = Utc.with_ymd_and_hms(1899, 12, 30, 12, 0, 0).unwrap();
        assert!(Timestamp::from_datetime(t).is_err());
    }

    #[test]
    fn test_round_trip_with_subsecond_precision() {
        let t = Utc
            .with_ymd_and_hms(2024, 6, 15, 13, 45, 30)
            .unwrap()
            .checked_add_signed(chrono::Duration::nanoseconds(250_000_000))
            .unwrap();
        let ts = Timestamp::from_datetime(t).unwrap();
        assert_eq!(ts.to_datetime().unwrap(), t);
    }

    #[test]
    fn test_correction_applied_once_each_way() {
        let t = Utc.with_ymd_and_hms(2000, 3, 1, 0, 0, 0).unwrap();
        let once = Timestamp::from_datetime(t).unwrap();
        let twice = Timestamp::from_datetime(once.to_datetime().unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_encode_decode_is_bit_exact() {
        let ts = Timestamp {
            days: 45_000,
            seconds: 12_345.678_901,
        };
        let mut buf = BytesMut::new();
        ts.encode(&mut buf);
        assert_eq!(buf.len(), Timestamp::BYTE_SIZE);
        let decoded = Timestamp::decode(&buf).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_decode_short_buffer() {
        assert!(Timestamp::decode(&[0u8; 11]).is_err());
    }

    #[test]
    fn test_invalid_seconds_rejected() {
        let ts = Timestamp {
            days: 25_569,
            seconds: 90_000.0,
        };
        assert!(ts.to_datetime().is_err());

        let ts = Timestamp {
            days: 25_569,
            seconds: f64::NAN,
        };
        assert!(ts.to_datetime().is_err());
    }
}
