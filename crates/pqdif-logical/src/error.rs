//! Error types for the logical layer.
//!
//! Protocol errors describe a file whose record sequence is malformed;
//! they are fatal. Semantic absences (a required child element missing
//! from a record) surface as `MissingElement` with the tag that was looked
//! up, never as a silent default.

use thiserror::Error;
use uuid::Uuid;

use pqdif_physical::RecordType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("first record is not a container record")]
    MissingContainer,

    #[error("unexpected second container record")]
    DuplicateContainer,

    #[error("observation record with no preceding data source")]
    ObservationWithoutDataSource,

    #[error("expected a {expected} record, found {found}")]
    UnexpectedRecordType {
        expected: RecordType,
        found: RecordType,
    },

    #[error("record has no body")]
    MissingBody,

    #[error("required element {tag} is missing")]
    MissingElement { tag: Uuid },

    #[error("channel definition index {index} out of range ({count} defined)")]
    ChannelDefinitionIndexOutOfRange { index: usize, count: usize },

    #[error("channel instance index {index} out of range ({count} present)")]
    ChannelIndexOutOfRange { index: usize, count: usize },

    #[error("series instance index {index} out of range ({count} present)")]
    SeriesIndexOutOfRange { index: usize, count: usize },

    #[error("series share references form a cycle")]
    SeriesShareCycle,

    #[error("malformed increment-encoded series: {0}")]
    MalformedIncrementSeries(String),

    #[error(transparent)]
    Physical(#[from] pqdif_physical::Error),

    #[error(transparent)]
    Core(#[from] pqdif_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
