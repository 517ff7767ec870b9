//! Logical layer of PQDIF (IEEE 1159.3).
//!
//! The physical layer yields a stream of records holding element trees;
//! this crate names them. A well-formed file is one container record
//! followed by data source, monitor settings, and observation records, in
//! the order the instrument emitted them. The [`parser::LogicalParser`]
//! enforces that protocol and yields observations annotated with the data
//! source and monitor settings in force; [`writer::LogicalWriter`] produces
//! files with the same shape.
//!
//! The record views ([`ContainerRecord`], [`DataSourceRecord`],
//! [`MonitorSettingsRecord`], [`ObservationRecord`] and the channel/series
//! views beneath them) are typed accessors over the underlying element
//! tree: reading resolves well-known tags, writing creates or replaces the
//! addressed child. Each record view owns its tree; instance views borrow
//! from their owning record.

pub mod container;
pub mod data_source;
pub mod error;
pub mod monitor_settings;
pub mod observation;
pub mod parser;
pub mod writer;

pub use container::ContainerRecord;
pub use data_source::{ChannelDefinition, DataSourceRecord, SeriesDefinition};
pub use error::{Error, Result};
pub use monitor_settings::{ChannelSetting, MonitorSettingsRecord};
pub use observation::{ChannelInstance, ObservationRecord, SeriesInstance};
pub use parser::LogicalParser;
pub use writer::LogicalWriter;

use pqdif_core::CollectionElement;
use pqdif_physical::Record;

/// The body tree of a logical record. Logical record constructors reject
/// bodiless records, so this cannot fail afterwards.
pub(crate) fn record_body(record: &Record) -> &CollectionElement {
    match &record.body {
        Some(body) => body,
        None => unreachable!("logical records always carry a body"),
    }
}

pub(crate) fn record_body_mut(record: &mut Record) -> &mut CollectionElement {
    match &mut record.body {
        Some(body) => body,
        None => unreachable!("logical records always carry a body"),
    }
}
