//! Observation records: the measurements themselves.
//!
//! An observation is a set of channel instances, each referencing a
//! channel definition in the data source that was in force when the
//! observation was recorded. Under each channel instance sit series
//! instances holding the stored sample vectors.
//!
//! [`SeriesInstance::original_values`] reconstructs the logical value
//! sequence from the stored one by applying, in order: increment
//! expansion, scale/offset, and the transducer ratio. Timestamp series
//! bypass scale and ratio. A series may also *share* another series'
//! values/scale/offset by index; resolution follows those references and
//! reports a cycle instead of looping.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use pqdif_core::tags::{self, series_value_type, storage_methods};
use pqdif_core::{CollectionElement, Element, PhysicalType, Timestamp, Value, VectorElement};
use pqdif_physical::{Record, RecordType};

use crate::data_source::{ChannelDefinition, DataSourceRecord, SeriesDefinition};
use crate::error::{Error, Result};
use crate::monitor_settings::{ChannelSetting, MonitorSettingsRecord};
use crate::{record_body, record_body_mut};

/// Typed view over an observation record.
///
/// Owns its element tree and holds the data source (and, when present,
/// monitor settings) that were current when the observation was read or
/// built.
#[derive(Debug, Clone)]
pub struct ObservationRecord {
    record: Record,
    data_source: Arc<DataSourceRecord>,
    settings: Option<Arc<MonitorSettingsRecord>>,
}

impl ObservationRecord {
    /// Creates an empty observation bound to a data source.
    pub fn new(
        data_source: Arc<DataSourceRecord>,
        settings: Option<Arc<MonitorSettingsRecord>>,
    ) -> Self {
        ObservationRecord {
            record: Record::new(tags::RECORD_TYPE_OBSERVATION),
            data_source,
            settings,
        }
    }

    /// Wraps a parsed record, which must be an observation with a body.
    pub fn from_record(
        record: Record,
        data_source: Arc<DataSourceRecord>,
        settings: Option<Arc<MonitorSettingsRecord>>,
    ) -> Result<Self> {
        if record.record_type() != RecordType::Observation {
            return Err(Error::UnexpectedRecordType {
                expected: RecordType::Observation,
                found: record.record_type(),
            });
        }
        if record.body.is_none() {
            return Err(Error::MissingBody);
        }
        Ok(ObservationRecord {
            record,
            data_source,
            settings,
        })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// The data source this observation's channels reference.
    pub fn data_source(&self) -> &DataSourceRecord {
        &self.data_source
    }

    /// The monitor settings in force, if any were recorded.
    pub fn settings(&self) -> Option<&MonitorSettingsRecord> {
        self.settings.as_deref()
    }

    pub fn name(&self) -> Result<String> {
        let vector = record_body(&self.record)
            .get_vector_by_tag(tags::OBSERVATION_NAME)
            .ok_or(Error::MissingElement {
                tag: tags::OBSERVATION_NAME,
            })?;
        Ok(vector.get_string()?)
    }

    pub fn set_name(&mut self, name: &str) {
        record_body_mut(&mut self.record)
            .get_or_add_vector(tags::OBSERVATION_NAME)
            .set_string(name);
    }

    pub fn start_time(&self) -> Result<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::TIME_START)
            .ok_or(Error::MissingElement {
                tag: tags::TIME_START,
            })?
            .get_timestamp()
            .map_err(Error::from)
    }

    pub fn set_start_time(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::TIME_START)
            .set_timestamp(timestamp);
    }

    pub fn create_time(&self) -> Option<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::TIME_CREATE)?
            .get_timestamp()
            .ok()
    }

    pub fn set_create_time(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::TIME_CREATE)
            .set_timestamp(timestamp);
    }

    pub fn time_triggered(&self) -> Option<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::TIME_TRIGGERED)?
            .get_timestamp()
            .ok()
    }

    pub fn set_time_triggered(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::TIME_TRIGGERED)
            .set_timestamp(timestamp);
    }

    /// IEEE 1159 disturbance category of the observation, if recorded.
    pub fn disturbance_category_id(&self) -> Option<Uuid> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::DISTURBANCE_CATEGORY_ID)?
            .get_uuid()
            .ok()
    }

    pub fn set_disturbance_category_id(&mut self, id: Uuid) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::DISTURBANCE_CATEGORY_ID)
            .set_uuid(id);
    }

    /// Human name of the disturbance category, resolved through the tag
    /// registry.
    pub fn disturbance_category_name(&self) -> Option<String> {
        pqdif_tags::semantics::DISTURBANCE_CATEGORY.name_of(self.disturbance_category_id()?)
    }

    pub fn trigger_method(&self) -> Option<u32> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::TRIGGER_METHOD)?
            .get_u32()
            .ok()
    }

    pub fn set_trigger_method(&mut self, method: u32) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::TRIGGER_METHOD)
            .set_u32(method);
    }

    /// The channel instances, in stored order.
    pub fn channel_instances(&self) -> Vec<ChannelInstance<'_>> {
        record_body(&self.record)
            .get_collection_by_tag(tags::CHANNEL_INSTANCES)
            .map(|instances| {
                instances
                    .get_all_by_tag(tags::ONE_CHANNEL_INSTANCE)
                    .filter_map(Element::as_collection)
                    .enumerate()
                    .map(|(index, body)| ChannelInstance {
                        body,
                        observation: self,
                        index,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn channel_instance(&self, index: usize) -> Result<ChannelInstance<'_>> {
        let instances = self.channel_instances();
        let count = instances.len();
        instances
            .into_iter()
            .nth(index)
            .ok_or(Error::ChannelIndexOutOfRange { index, count })
    }

    /// Appends a new channel instance, creating the containing collection
    /// on first insert, and returns a mutable view of it.
    pub fn add_channel_instance(&mut self, definition_index: u32) -> ChannelInstanceMut<'_> {
        let instances =
            record_body_mut(&mut self.record).get_or_add_collection(tags::CHANNEL_INSTANCES);
        let mut body = CollectionElement::new(tags::ONE_CHANNEL_INSTANCE);
        body.get_or_add_scalar(tags::CHANNEL_DEFINITION_INDEX)
            .set_u32(definition_index);
        instances.add(Element::Collection(body));
        match instances.elements_mut().last_mut() {
            Some(Element::Collection(body)) => ChannelInstanceMut { body },
            _ => unreachable!("a collection was just appended"),
        }
    }
}

/// Read view of one channel instance.
#[derive(Debug, Clone, Copy)]
pub struct ChannelInstance<'a> {
    body: &'a CollectionElement,
    observation: &'a ObservationRecord,
    index: usize,
}

impl<'a> ChannelInstance<'a> {
    /// Position of this instance within the observation.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the channel definition this instance realizes.
    pub fn channel_definition_index(&self) -> Result<u32> {
        self.body
            .get_scalar_by_tag(tags::CHANNEL_DEFINITION_INDEX)
            .ok_or(Error::MissingElement {
                tag: tags::CHANNEL_DEFINITION_INDEX,
            })?
            .get_u32()
            .map_err(Error::from)
    }

    pub fn channel_group_id(&self) -> Option<u32> {
        self.body
            .get_scalar_by_tag(tags::CHANNEL_GROUP_ID)?
            .get_u32()
            .ok()
    }

    /// The channel definition in the observation's data source.
    pub fn definition(&self) -> Result<ChannelDefinition<'a>> {
        let index = self.channel_definition_index()? as usize;
        self.observation.data_source.channel_definition(index)
    }

    /// The channel setting applying to this channel, if the monitor
    /// settings record one.
    pub fn setting(&self) -> Option<ChannelSetting<'a>> {
        let index = self.channel_definition_index().ok()?;
        self.observation.settings.as_deref()?.channel_setting_for(index)
    }

    /// The series instances of this channel, in stored order.
    pub fn series_instances(&self) -> Vec<SeriesInstance<'a>> {
        self.body
            .get_collection_by_tag(tags::SERIES_INSTANCES)
            .map(|list| {
                list.get_all_by_tag(tags::ONE_SERIES_INSTANCE)
                    .filter_map(Element::as_collection)
                    .enumerate()
                    .map(|(index, body)| SeriesInstance {
                        body,
                        channel: *self,
                        index,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn series_instance(&self, index: usize) -> Result<SeriesInstance<'a>> {
        let instances = self.series_instances();
        let count = instances.len();
        instances
            .into_iter()
            .nth(index)
            .ok_or(Error::SeriesIndexOutOfRange { index, count })
    }
}

/// Mutable view of one channel instance.
pub struct ChannelInstanceMut<'a> {
    body: &'a mut CollectionElement,
}

impl<'a> ChannelInstanceMut<'a> {
    pub fn set_channel_group_id(&mut self, group: u32) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::CHANNEL_GROUP_ID)
            .set_u32(group);
        self
    }

    /// Appends a new, empty series instance and returns a mutable view of
    /// it.
    pub fn add_series_instance(&mut self) -> SeriesInstanceMut<'_> {
        let list = self.body.get_or_add_collection(tags::SERIES_INSTANCES);
        list.add(Element::Collection(CollectionElement::new(
            tags::ONE_SERIES_INSTANCE,
        )));
        match list.elements_mut().last_mut() {
            Some(Element::Collection(body)) => SeriesInstanceMut { body },
            _ => unreachable!("a collection was just appended"),
        }
    }
}

/// Read view of one series instance.
#[derive(Debug, Clone, Copy)]
pub struct SeriesInstance<'a> {
    body: &'a CollectionElement,
    channel: ChannelInstance<'a>,
    index: usize,
}

impl<'a> SeriesInstance<'a> {
    /// Position of this series within its channel instance.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The matching series definition: the one at this instance's position
    /// in the channel definition.
    pub fn definition(&self) -> Result<SeriesDefinition<'a>> {
        self.channel.definition()?.series_definition(self.index)
    }

    /// The locally stored values vector, if present (shared series have
    /// none).
    pub fn values_vector(&self) -> Option<&'a VectorElement> {
        self.body.get_vector_by_tag(tags::SERIES_VALUES)
    }

    pub fn scale(&self) -> Option<Value> {
        self.body
            .get_scalar_by_tag(tags::SERIES_SCALE)
            .and_then(|scalar| scalar.get().ok())
    }

    pub fn offset(&self) -> Option<Value> {
        self.body
            .get_scalar_by_tag(tags::SERIES_OFFSET)
            .and_then(|scalar| scalar.get().ok())
    }

    pub fn share_channel_index(&self) -> Option<u32> {
        self.body
            .get_scalar_by_tag(tags::SERIES_SHARE_CHANNEL_INDEX)?
            .get_u32()
            .ok()
    }

    pub fn share_series_index(&self) -> Option<u32> {
        self.body
            .get_scalar_by_tag(tags::SERIES_SHARE_SERIES_INDEX)?
            .get_u32()
            .ok()
    }

    /// Reconstructs the logical value sequence from the stored one.
    ///
    /// Applies, in order: increment expansion when the storage method has
    /// the increment bit, then scale/offset when it has the scaled bit,
    /// then the transducer ratio when the monitor settings call for one.
    /// Timestamp series bypass scale and ratio.
    pub fn original_values(&self) -> Result<Vec<Value>> {
        let mut visited = HashSet::new();
        visited.insert((self.channel.index, self.index));
        let vector = self.resolve_values(&mut visited)?;

        let definition = self.definition()?;
        let storage = definition.storage_methods();
        let is_time = definition.value_type_id().ok() == Some(series_value_type::TIME)
            || vector.value_type() == PhysicalType::Timestamp;

        let mut values: Vec<Value> = if storage & storage_methods::INCREMENT != 0
            && vector.value_type() != PhysicalType::Timestamp
        {
            expand_increments(vector)?
        } else {
            vector.values()?
        };

        if !is_time && storage & storage_methods::SCALED != 0 {
            let scale = match self.resolve_scale(&mut self.fresh_visited())? {
                Some(value) => value.as_f64()?,
                None => 1.0,
            };
            let offset = match self.resolve_offset(&mut self.fresh_visited())? {
                Some(value) => value.as_f64()?,
                None => 0.0,
            };
            values = values
                .into_iter()
                .map(|value| Ok(Value::Real8(offset + value.as_f64()? * scale)))
                .collect::<Result<_>>()?;
        }

        if !is_time {
            if let Some(ratio) = self.transducer_ratio() {
                values = values
                    .into_iter()
                    .map(|value| Ok(Value::Real8(value.as_f64()? * ratio)))
                    .collect::<Result<_>>()?;
            }
        }

        Ok(values)
    }

    /// The system/monitor ratio to apply, when the settings mark
    /// `use_transducer` and this channel's setting has both sides.
    fn transducer_ratio(&self) -> Option<f64> {
        let settings = self.channel.observation.settings.as_deref()?;
        if !settings.use_transducer() {
            return None;
        }
        let setting = self.channel.setting()?;
        let system = setting.system_side_ratio()?;
        let monitor = setting.monitor_side_ratio()?;
        Some(system / monitor)
    }

    fn fresh_visited(&self) -> HashSet<(usize, usize)> {
        let mut visited = HashSet::new();
        visited.insert((self.channel.index, self.index));
        visited
    }

    /// Follows the share reference, if any, guarding against cycles.
    fn shared_target(
        &self,
        visited: &mut HashSet<(usize, usize)>,
    ) -> Result<Option<SeriesInstance<'a>>> {
        let (Some(channel_index), Some(series_index)) =
            (self.share_channel_index(), self.share_series_index())
        else {
            return Ok(None);
        };
        let key = (channel_index as usize, series_index as usize);
        if !visited.insert(key) {
            return Err(Error::SeriesShareCycle);
        }
        let channel = self
            .channel
            .observation
            .channel_instance(channel_index as usize)?;
        Ok(Some(channel.series_instance(series_index as usize)?))
    }

    fn resolve_values(
        &self,
        visited: &mut HashSet<(usize, usize)>,
    ) -> Result<&'a VectorElement> {
        if let Some(vector) = self.values_vector() {
            return Ok(vector);
        }
        match self.shared_target(visited)? {
            Some(target) => target.resolve_values(visited),
            None => Err(Error::MissingElement {
                tag: tags::SERIES_VALUES,
            }),
        }
    }

    fn resolve_scale(&self, visited: &mut HashSet<(usize, usize)>) -> Result<Option<Value>> {
        if let Some(value) = self.scale() {
            return Ok(Some(value));
        }
        match self.shared_target(visited)? {
            Some(target) => target.resolve_scale(visited),
            None => Ok(None),
        }
    }

    fn resolve_offset(&self, visited: &mut HashSet<(usize, usize)>) -> Result<Option<Value>> {
        if let Some(value) = self.offset() {
            return Ok(Some(value));
        }
        match self.shared_target(visited)? {
            Some(target) => target.resolve_offset(visited),
            None => Ok(None),
        }
    }
}

/// Mutable view of one series instance.
pub struct SeriesInstanceMut<'a> {
    body: &'a mut CollectionElement,
}

impl<'a> SeriesInstanceMut<'a> {
    /// Replaces the stored values vector.
    pub fn set_values(&mut self, values: &[Value]) -> Result<()> {
        self.body
            .get_or_add_vector(tags::SERIES_VALUES)
            .set_values(values)?;
        Ok(())
    }

    pub fn set_scale(&mut self, scale: Value) -> &mut Self {
        self.body.get_or_add_scalar(tags::SERIES_SCALE).set(scale);
        self
    }

    pub fn set_offset(&mut self, offset: Value) -> &mut Self {
        self.body.get_or_add_scalar(tags::SERIES_OFFSET).set(offset);
        self
    }

    /// Points this series at another channel/series pair for its values.
    pub fn set_share(&mut self, channel_index: u32, series_index: u32) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::SERIES_SHARE_CHANNEL_INDEX)
            .set_u32(channel_index);
        self.body
            .get_or_add_scalar(tags::SERIES_SHARE_SERIES_INDEX)
            .set_u32(series_index);
        self
    }
}

/// Expands an increment-encoded vector: a rate count followed by
/// (count, increment) pairs, each pair producing `start + j × increment`
/// with `start` advancing by `count × increment` between pairs.
fn expand_increments(vector: &VectorElement) -> Result<Vec<Value>> {
    let numbers = vector
        .values()?
        .iter()
        .map(Value::as_f64)
        .collect::<pqdif_core::Result<Vec<f64>>>()?;

    let Some((&rate_count, pairs)) = numbers.split_first() else {
        return Err(Error::MalformedIncrementSeries(
            "empty values vector".to_string(),
        ));
    };
    let rate_count = rate_count as usize;
    if pairs.len() != 2 * rate_count {
        return Err(Error::MalformedIncrementSeries(format!(
            "rate count {} needs {} entries, found {}",
            rate_count,
            2 * rate_count,
            pairs.len()
        )));
    }

    let mut out = Vec::new();
    let mut start = 0.0;
    for pair in pairs.chunks_exact(2) {
        let count = pair[0] as usize;
        let increment = pair[1];
        for j in 0..count {
            out.push(Value::Real8(start + j as f64 * increment));
        }
        start += count as f64 * increment;
    }
    Ok(out)
}
