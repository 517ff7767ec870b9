//! The logical writer: producing well-formed files.
//!
//! Records are written in protocol order: the container first, then data
//! sources, monitor settings, and observations as the caller supplies
//! them. The terminal record's next-record pointer must be zero, and no
//! record knows it is last until the file is closed, so one record is
//! always held pending, flushed with `last = false` when a successor
//! arrives and with `last = true` on close.
//!
//! The container itself is always written uncompressed; its compression
//! declaration takes effect for every record after it.

use std::path::Path;

use bytes::Bytes;

use pqdif_physical::{CompressionAlgorithm, CompressionStyle, Record, Writer};

use crate::container::ContainerRecord;
use crate::data_source::DataSourceRecord;
use crate::error::{Error, Result};
use crate::monitor_settings::MonitorSettingsRecord;
use crate::observation::ObservationRecord;

/// Writes a logically well-formed PQDIF file.
pub struct LogicalWriter {
    physical: Writer,
    pending: Option<Record>,
    pending_compression: Option<(CompressionAlgorithm, CompressionStyle)>,
    wrote_container: bool,
    wrote_data_source: bool,
}

impl LogicalWriter {
    pub fn new() -> Self {
        LogicalWriter {
            physical: Writer::new(),
            pending: None,
            pending_compression: None,
            wrote_container: false,
            wrote_data_source: false,
        }
    }

    /// Queues the container record. Must be called exactly once, first.
    pub fn write_container(&mut self, container: ContainerRecord) -> Result<()> {
        if self.wrote_container {
            return Err(Error::DuplicateContainer);
        }
        // The declared compression kicks in after the container is flushed.
        let algorithm = container.compression_algorithm()?;
        let style = container.compression_style()?;
        pqdif_physical::compression::ensure_supported(algorithm, style)?;

        self.pending = Some(container.into_record());
        self.pending_compression = Some((algorithm, style));
        self.wrote_container = true;
        Ok(())
    }

    /// Queues a data source record.
    pub fn write_data_source(&mut self, data_source: DataSourceRecord) -> Result<()> {
        self.queue(data_source.into_record())?;
        self.wrote_data_source = true;
        Ok(())
    }

    /// Queues a monitor settings record.
    pub fn write_monitor_settings(&mut self, settings: MonitorSettingsRecord) -> Result<()> {
        self.queue(settings.into_record())
    }

    /// Queues an observation record. A data source must precede it.
    pub fn write_observation(&mut self, observation: ObservationRecord) -> Result<()> {
        if !self.wrote_data_source {
            return Err(Error::ObservationWithoutDataSource);
        }
        self.queue(observation.into_record())
    }

    /// Flushes the final record with a zero next-record pointer and
    /// returns the file image.
    pub fn close(mut self) -> Result<Bytes> {
        if !self.wrote_container {
            return Err(Error::MissingContainer);
        }
        self.flush_pending(true)?;
        Ok(self.physical.into_bytes())
    }

    /// Closes the file and writes it to disk.
    pub async fn save(mut self, path: impl AsRef<Path>) -> Result<()> {
        if !self.wrote_container {
            return Err(Error::MissingContainer);
        }
        self.flush_pending(true)?;
        self.physical.save(path).await?;
        Ok(())
    }

    fn queue(&mut self, record: Record) -> Result<()> {
        if !self.wrote_container {
            return Err(Error::MissingContainer);
        }
        self.flush_pending(false)?;
        self.pending = Some(record);
        Ok(())
    }

    fn flush_pending(&mut self, last: bool) -> Result<()> {
        if let Some(mut record) = self.pending.take() {
            self.physical.write_record(&mut record, last)?;
            if let Some((algorithm, style)) = self.pending_compression.take() {
                self.physical.set_compression(algorithm, style)?;
            }
        }
        Ok(())
    }
}

impl Default for LogicalWriter {
    fn default() -> Self {
        LogicalWriter::new()
    }
}
