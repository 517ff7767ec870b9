//! Data source records: where measurements come from.
//!
//! A data source defines the channels an instrument can observe. Each
//! channel definition names the quantity being measured and carries the
//! series definitions that describe how its sample series are stored
//! (directly, scaled, or increment-encoded).

use uuid::Uuid;

use pqdif_core::{tags, CollectionElement, Element, Timestamp};
use pqdif_physical::{Record, RecordType};

use crate::error::{Error, Result};
use crate::{record_body, record_body_mut};

/// Typed view over a data source record. Owns its element tree.
#[derive(Debug, Clone)]
pub struct DataSourceRecord {
    record: Record,
}

impl DataSourceRecord {
    /// Creates an empty data source with the given name.
    pub fn new(name: &str) -> Self {
        let mut source = DataSourceRecord {
            record: Record::new(tags::RECORD_TYPE_DATA_SOURCE),
        };
        source.set_name(name);
        source
    }

    /// Wraps a parsed record, which must be a data source with a body.
    pub fn from_record(record: Record) -> Result<Self> {
        if record.record_type() != RecordType::DataSource {
            return Err(Error::UnexpectedRecordType {
                expected: RecordType::DataSource,
                found: record.record_type(),
            });
        }
        if record.body.is_none() {
            return Err(Error::MissingBody);
        }
        Ok(DataSourceRecord { record })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Human-readable name of the source.
    pub fn name(&self) -> Result<String> {
        let vector = record_body(&self.record)
            .get_vector_by_tag(tags::DATA_SOURCE_NAME)
            .ok_or(Error::MissingElement {
                tag: tags::DATA_SOURCE_NAME,
            })?;
        Ok(vector.get_string()?)
    }

    pub fn set_name(&mut self, name: &str) {
        record_body_mut(&mut self.record)
            .get_or_add_vector(tags::DATA_SOURCE_NAME)
            .set_string(name);
    }

    /// Identifier naming the kind of source (measurement, simulation, ...).
    pub fn data_source_type_id(&self) -> Result<Uuid> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::DATA_SOURCE_TYPE_ID)
            .ok_or(Error::MissingElement {
                tag: tags::DATA_SOURCE_TYPE_ID,
            })?
            .get_uuid()
            .map_err(Error::from)
    }

    pub fn set_data_source_type_id(&mut self, id: Uuid) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::DATA_SOURCE_TYPE_ID)
            .set_uuid(id);
    }

    pub fn vendor_id(&self) -> Option<Uuid> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::VENDOR_ID)?
            .get_uuid()
            .ok()
    }

    pub fn set_vendor_id(&mut self, id: Uuid) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::VENDOR_ID)
            .set_uuid(id);
    }

    pub fn equipment_id(&self) -> Option<Uuid> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::EQUIPMENT_ID)?
            .get_uuid()
            .ok()
    }

    /// Human name of the equipment, resolved through the tag registry.
    pub fn equipment_name(&self) -> Option<String> {
        pqdif_tags::semantics::EQUIPMENT.name_of(self.equipment_id()?)
    }

    pub fn set_equipment_id(&mut self, id: Uuid) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::EQUIPMENT_ID)
            .set_uuid(id);
    }

    /// When this source takes effect.
    pub fn effective(&self) -> Option<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::EFFECTIVE)?
            .get_timestamp()
            .ok()
    }

    pub fn set_effective(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::EFFECTIVE)
            .set_timestamp(timestamp);
    }

    /// The channel definitions, in definition order.
    pub fn channel_definitions(&self) -> Vec<ChannelDefinition<'_>> {
        record_body(&self.record)
            .get_collection_by_tag(tags::CHANNEL_DEFINITIONS)
            .map(|definitions| {
                definitions
                    .get_all_by_tag(tags::ONE_CHANNEL_DEFINITION)
                    .filter_map(Element::as_collection)
                    .map(|body| ChannelDefinition { body })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The channel definition at `index`, as referenced by channel
    /// instances and channel settings.
    pub fn channel_definition(&self, index: usize) -> Result<ChannelDefinition<'_>> {
        let definitions = self.channel_definitions();
        let count = definitions.len();
        definitions
            .into_iter()
            .nth(index)
            .ok_or(Error::ChannelDefinitionIndexOutOfRange { index, count })
    }

    /// Appends a new, empty channel definition and returns a mutable view
    /// of it.
    pub fn add_channel_definition(&mut self) -> ChannelDefinitionMut<'_> {
        let definitions =
            record_body_mut(&mut self.record).get_or_add_collection(tags::CHANNEL_DEFINITIONS);
        definitions.add(Element::Collection(CollectionElement::new(
            tags::ONE_CHANNEL_DEFINITION,
        )));
        match definitions.elements_mut().last_mut() {
            Some(Element::Collection(body)) => ChannelDefinitionMut { body },
            _ => unreachable!("a collection was just appended"),
        }
    }
}

/// Read view of one channel definition.
#[derive(Debug, Clone, Copy)]
pub struct ChannelDefinition<'a> {
    body: &'a CollectionElement,
}

impl<'a> ChannelDefinition<'a> {
    pub fn name(&self) -> Option<String> {
        self.body
            .get_vector_by_tag(tags::CHANNEL_NAME)?
            .get_string()
            .ok()
    }

    pub fn phase_id(&self) -> Option<u32> {
        self.body.get_scalar_by_tag(tags::PHASE_ID)?.get_u32().ok()
    }

    /// What kind of quantity the channel observes (waveform, phasor, ...).
    pub fn quantity_type_id(&self) -> Result<Uuid> {
        self.body
            .get_scalar_by_tag(tags::QUANTITY_TYPE_ID)
            .ok_or(Error::MissingElement {
                tag: tags::QUANTITY_TYPE_ID,
            })?
            .get_uuid()
            .map_err(Error::from)
    }

    pub fn quantity_measured_id(&self) -> Option<u32> {
        self.body
            .get_scalar_by_tag(tags::QUANTITY_MEASURED_ID)?
            .get_u32()
            .ok()
    }

    /// Human name of the quantity type, resolved through the tag registry.
    pub fn quantity_type_name(&self) -> Option<String> {
        pqdif_tags::semantics::QUANTITY_TYPE.name_of(self.quantity_type_id().ok()?)
    }

    /// The series definitions of this channel, in definition order.
    pub fn series_definitions(&self) -> Vec<SeriesDefinition<'a>> {
        self.body
            .get_collection_by_tag(tags::SERIES_DEFINITIONS)
            .map(|definitions| {
                definitions
                    .get_all_by_tag(tags::ONE_SERIES_DEFINITION)
                    .filter_map(Element::as_collection)
                    .map(|body| SeriesDefinition { body })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn series_definition(&self, index: usize) -> Result<SeriesDefinition<'a>> {
        let definitions = self.series_definitions();
        let count = definitions.len();
        definitions
            .into_iter()
            .nth(index)
            .ok_or(Error::SeriesIndexOutOfRange { index, count })
    }
}

/// Mutable view of one channel definition.
pub struct ChannelDefinitionMut<'a> {
    body: &'a mut CollectionElement,
}

impl<'a> ChannelDefinitionMut<'a> {
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.body.get_or_add_vector(tags::CHANNEL_NAME).set_string(name);
        self
    }

    pub fn set_phase_id(&mut self, phase: u32) -> &mut Self {
        self.body.get_or_add_scalar(tags::PHASE_ID).set_u32(phase);
        self
    }

    pub fn set_quantity_type_id(&mut self, id: Uuid) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::QUANTITY_TYPE_ID)
            .set_uuid(id);
        self
    }

    pub fn set_quantity_measured_id(&mut self, id: u32) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::QUANTITY_MEASURED_ID)
            .set_u32(id);
        self
    }

    /// Appends a new, empty series definition and returns a mutable view
    /// of it.
    pub fn add_series_definition(&mut self) -> SeriesDefinitionMut<'_> {
        let definitions = self.body.get_or_add_collection(tags::SERIES_DEFINITIONS);
        definitions.add(Element::Collection(CollectionElement::new(
            tags::ONE_SERIES_DEFINITION,
        )));
        match definitions.elements_mut().last_mut() {
            Some(Element::Collection(body)) => SeriesDefinitionMut { body },
            _ => unreachable!("a collection was just appended"),
        }
    }
}

/// Read view of one series definition.
#[derive(Debug, Clone, Copy)]
pub struct SeriesDefinition<'a> {
    body: &'a CollectionElement,
}

impl<'a> SeriesDefinition<'a> {
    /// What the series holds: time, values, minima, ...
    pub fn value_type_id(&self) -> Result<Uuid> {
        self.body
            .get_scalar_by_tag(tags::VALUE_TYPE_ID)
            .ok_or(Error::MissingElement {
                tag: tags::VALUE_TYPE_ID,
            })?
            .get_uuid()
            .map_err(Error::from)
    }

    pub fn quantity_units_id(&self) -> Option<u32> {
        self.body
            .get_scalar_by_tag(tags::QUANTITY_UNITS_ID)?
            .get_u32()
            .ok()
    }

    pub fn quantity_characteristic_id(&self) -> Option<Uuid> {
        self.body
            .get_scalar_by_tag(tags::QUANTITY_CHARACTERISTIC_ID)?
            .get_uuid()
            .ok()
    }

    /// Human name of the series value type, resolved through the tag
    /// registry.
    pub fn value_type_name(&self) -> Option<String> {
        pqdif_tags::semantics::SERIES_VALUE_TYPE.name_of(self.value_type_id().ok()?)
    }

    /// Storage method bit flags. Absent means plain stored values.
    pub fn storage_methods(&self) -> u32 {
        self.body
            .get_scalar_by_tag(tags::STORAGE_METHOD_ID)
            .and_then(|scalar| scalar.get_u32().ok())
            .unwrap_or(tags::storage_methods::VALUES)
    }
}

/// Mutable view of one series definition.
pub struct SeriesDefinitionMut<'a> {
    body: &'a mut CollectionElement,
}

impl<'a> SeriesDefinitionMut<'a> {
    pub fn set_value_type_id(&mut self, id: Uuid) -> &mut Self {
        self.body.get_or_add_scalar(tags::VALUE_TYPE_ID).set_uuid(id);
        self
    }

    pub fn set_quantity_units_id(&mut self, id: u32) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::QUANTITY_UNITS_ID)
            .set_u32(id);
        self
    }

    pub fn set_quantity_characteristic_id(&mut self, id: Uuid) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::QUANTITY_CHARACTERISTIC_ID)
            .set_uuid(id);
        self
    }

    pub fn set_storage_methods(&mut self, methods: u32) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::STORAGE_METHOD_ID)
            .set_u32(methods);
        self
    }
}
