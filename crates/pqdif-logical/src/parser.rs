//! The logical parser: record sequencing.
//!
//! Wraps the physical parser and enforces the file protocol. The first
//! record must be the container; its compression declaration is propagated
//! to the physical parser before any later record is read. From then on
//! the parser is a pull iterator of observations: data source and monitor
//! settings records update the "current" state as they stream past
//! (most-recent-wins), blank and unrecognized records are skipped, and a
//! second container is a protocol error.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use pqdif_physical::{ParseIssue, Parser, RecordType};

use crate::container::ContainerRecord;
use crate::data_source::DataSourceRecord;
use crate::error::{Error, Result};
use crate::monitor_settings::MonitorSettingsRecord;
use crate::observation::ObservationRecord;

/// Pull iterator of observations over a PQDIF file.
pub struct LogicalParser {
    physical: Parser,
    container: ContainerRecord,
    current_data_source: Option<Arc<DataSourceRecord>>,
    current_settings: Option<Arc<MonitorSettingsRecord>>,
    data_sources: Vec<Arc<DataSourceRecord>>,
}

impl LogicalParser {
    /// Opens a file image: consumes the container record and arms the
    /// physical parser with its compression declaration.
    pub fn new(data: Bytes) -> Result<Self> {
        let mut physical = Parser::new(data);
        let record = physical.next_record()?.ok_or(Error::MissingContainer)?;
        if record.record_type() != RecordType::Container {
            return Err(Error::MissingContainer);
        }
        let container = ContainerRecord::from_record(record)?;

        let algorithm = container.compression_algorithm()?;
        let style = container.compression_style()?;
        physical.set_compression(algorithm, style)?;
        debug!(%algorithm, %style, "container read");

        Ok(LogicalParser {
            physical,
            container,
            current_data_source: None,
            current_settings: None,
            data_sources: Vec::new(),
        })
    }

    /// Reads a file from disk and opens it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read(path.as_ref()).await.map_err(
            |e| Error::Physical(pqdif_physical::Error::Io(e)),
        )?;
        LogicalParser::new(Bytes::from(data))
    }

    /// The container record read on open.
    pub fn container(&self) -> &ContainerRecord {
        &self.container
    }

    /// Every data source seen so far, in stream order.
    pub fn data_sources(&self) -> &[Arc<DataSourceRecord>] {
        &self.data_sources
    }

    /// The monitor settings currently in force, if any.
    pub fn current_settings(&self) -> Option<&Arc<MonitorSettingsRecord>> {
        self.current_settings.as_ref()
    }

    /// Non-fatal element-parse failures accumulated by the physical layer.
    pub fn errors(&self) -> &[ParseIssue] {
        self.physical.errors()
    }

    /// The next observation, or `None` at end of file.
    ///
    /// Intermediate data source and monitor settings records update the
    /// current state; a second container record is a protocol error; an
    /// observation seen before any data source is a protocol error.
    pub fn next_observation(&mut self) -> Result<Option<ObservationRecord>> {
        loop {
            let Some(record) = self.physical.next_record()? else {
                return Ok(None);
            };

            match record.record_type() {
                RecordType::Container => return Err(Error::DuplicateContainer),
                RecordType::DataSource => {
                    let source = Arc::new(DataSourceRecord::from_record(record)?);
                    self.data_sources.push(Arc::clone(&source));
                    self.current_data_source = Some(source);
                }
                RecordType::MonitorSettings => {
                    self.current_settings =
                        Some(Arc::new(MonitorSettingsRecord::from_record(record)?));
                }
                RecordType::Observation => {
                    let data_source = self
                        .current_data_source
                        .clone()
                        .ok_or(Error::ObservationWithoutDataSource)?;
                    let observation = ObservationRecord::from_record(
                        record,
                        data_source,
                        self.current_settings.clone(),
                    )?;
                    return Ok(Some(observation));
                }
                RecordType::Blank | RecordType::Unknown => {
                    debug!(record_type = %record.record_type(), "skipping record");
                }
            }
        }
    }
}
