//! Monitor settings records: the instrument configuration in force.
//!
//! Settings matter to consumers chiefly through the transducer ratios:
//! when `use_transducer` is set, a channel setting's system/monitor side
//! ratio pair rescales observed samples into system-side engineering
//! units.

use pqdif_core::{tags, CollectionElement, Element, Timestamp};
use pqdif_physical::{Record, RecordType};

use crate::error::{Error, Result};
use crate::{record_body, record_body_mut};

/// Typed view over a monitor settings record. Owns its element tree.
#[derive(Debug, Clone)]
pub struct MonitorSettingsRecord {
    record: Record,
}

impl MonitorSettingsRecord {
    /// Creates empty settings with the conventional 60 Hz nominal
    /// frequency.
    pub fn new() -> Self {
        let mut settings = MonitorSettingsRecord {
            record: Record::new(tags::RECORD_TYPE_MONITOR_SETTINGS),
        };
        settings.set_nominal_frequency(60.0);
        settings
    }

    /// Wraps a parsed record, which must be monitor settings with a body.
    pub fn from_record(record: Record) -> Result<Self> {
        if record.record_type() != RecordType::MonitorSettings {
            return Err(Error::UnexpectedRecordType {
                expected: RecordType::MonitorSettings,
                found: record.record_type(),
            });
        }
        if record.body.is_none() {
            return Err(Error::MissingBody);
        }
        Ok(MonitorSettingsRecord { record })
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

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

    pub fn time_installed(&self) -> Option<Timestamp> {
        record_body(&self.record)
            .get_scalar_by_tag(tags::TIME_INSTALLED)?
            .get_timestamp()
            .ok()
    }

    pub fn set_time_installed(&mut self, timestamp: Timestamp) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::TIME_INSTALLED)
            .set_timestamp(timestamp);
    }

    /// Whether calibration settings should be applied. Absent means no.
    pub fn use_calibration(&self) -> bool {
        record_body(&self.record)
            .get_scalar_by_tag(tags::USE_CALIBRATION)
            .and_then(|scalar| scalar.get_bool().ok())
            .unwrap_or(false)
    }

    pub fn set_use_calibration(&mut self, value: bool) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::USE_CALIBRATION)
            .set_bool(value);
    }

    /// Whether transducer ratios should be applied. Absent means no.
    pub fn use_transducer(&self) -> bool {
        record_body(&self.record)
            .get_scalar_by_tag(tags::USE_TRANSDUCER)
            .and_then(|scalar| scalar.get_bool().ok())
            .unwrap_or(false)
    }

    pub fn set_use_transducer(&mut self, value: bool) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::USE_TRANSDUCER)
            .set_bool(value);
    }

    /// Nominal line frequency; absent means 60 Hz.
    pub fn nominal_frequency(&self) -> f64 {
        record_body(&self.record)
            .get_scalar_by_tag(tags::NOMINAL_FREQUENCY)
            .and_then(|scalar| scalar.get_f64().ok())
            .unwrap_or(60.0)
    }

    pub fn set_nominal_frequency(&mut self, hertz: f64) {
        record_body_mut(&mut self.record)
            .get_or_add_scalar(tags::NOMINAL_FREQUENCY)
            .set_f64(hertz);
    }

    /// The per-channel settings, in stored order.
    pub fn channel_settings(&self) -> Vec<ChannelSetting<'_>> {
        record_body(&self.record)
            .get_collection_by_tag(tags::CHANNEL_SETTINGS_ARRAY)
            .map(|settings| {
                settings
                    .get_all_by_tag(tags::ONE_CHANNEL_SETTING)
                    .filter_map(Element::as_collection)
                    .map(|body| ChannelSetting { body })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The setting applying to the channel definition at
    /// `definition_index`, if one is recorded.
    pub fn channel_setting_for(&self, definition_index: u32) -> Option<ChannelSetting<'_>> {
        self.channel_settings()
            .into_iter()
            .find(|setting| setting.channel_definition_index().ok() == Some(definition_index))
    }

    /// Appends a new channel setting bound to the given channel definition
    /// index and returns a mutable view of it.
    pub fn add_channel_setting(&mut self, definition_index: u32) -> ChannelSettingMut<'_> {
        let settings =
            record_body_mut(&mut self.record).get_or_add_collection(tags::CHANNEL_SETTINGS_ARRAY);
        let mut body = CollectionElement::new(tags::ONE_CHANNEL_SETTING);
        body.get_or_add_scalar(tags::CHANNEL_DEFINITION_INDEX)
            .set_u32(definition_index);
        settings.add(Element::Collection(body));
        match settings.elements_mut().last_mut() {
            Some(Element::Collection(body)) => ChannelSettingMut { body },
            _ => unreachable!("a collection was just appended"),
        }
    }
}

impl Default for MonitorSettingsRecord {
    fn default() -> Self {
        MonitorSettingsRecord::new()
    }
}

/// Read view of one channel setting.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSetting<'a> {
    body: &'a CollectionElement,
}

impl<'a> ChannelSetting<'a> {
    /// Which channel definition this setting applies to.
    pub fn channel_definition_index(&self) -> Result<u32> {
        self.body
            .get_scalar_by_tag(tags::CHANNEL_DEFINITION_INDEX)
            .ok_or(Error::MissingElement {
                tag: tags::CHANNEL_DEFINITION_INDEX,
            })?
            .get_u32()
            .map_err(Error::from)
    }

    pub fn system_side_ratio(&self) -> Option<f64> {
        self.body
            .get_scalar_by_tag(tags::XD_SYSTEM_SIDE_RATIO)?
            .get_f64()
            .ok()
    }

    pub fn monitor_side_ratio(&self) -> Option<f64> {
        self.body
            .get_scalar_by_tag(tags::XD_MONITOR_SIDE_RATIO)?
            .get_f64()
            .ok()
    }
}

/// Mutable view of one channel setting.
pub struct ChannelSettingMut<'a> {
    body: &'a mut CollectionElement,
}

impl<'a> ChannelSettingMut<'a> {
    pub fn set_system_side_ratio(&mut self, ratio: f64) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::XD_SYSTEM_SIDE_RATIO)
            .set_f64(ratio);
        self
    }

    pub fn set_monitor_side_ratio(&mut self, ratio: f64) -> &mut Self {
        self.body
            .get_or_add_scalar(tags::XD_MONITOR_SIDE_RATIO)
            .set_f64(ratio);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MonitorSettingsRecord::new();
        assert!(!settings.use_calibration());
        assert!(!settings.use_transducer());
        assert_eq!(settings.nominal_frequency(), 60.0);
        assert!(settings.channel_settings().is_empty());
        assert!(settings.effective().is_none());
    }

    #[test]
    fn test_channel_setting_lookup_by_definition_index() {
        let mut settings = MonitorSettingsRecord::new();
        settings
            .add_channel_setting(0)
            .set_system_side_ratio(2400.0)
            .set_monitor_side_ratio(120.0);
        settings.add_channel_setting(3);

        let setting = settings.channel_setting_for(0).unwrap();
        assert_eq!(setting.system_side_ratio().unwrap(), 2400.0);
        assert_eq!(setting.monitor_side_ratio().unwrap(), 120.0);

        let bare = settings.channel_setting_for(3).unwrap();
        assert!(bare.system_side_ratio().is_none());

        assert!(settings.channel_setting_for(7).is_none());
    }

    #[test]
    fn test_flags_round_trip() {
        let mut settings = MonitorSettingsRecord::new();
        settings.set_use_transducer(true);
        settings.set_use_calibration(true);
        settings.set_nominal_frequency(50.0);
        assert!(settings.use_transducer());
        assert!(settings.use_calibration());
        assert_eq!(settings.nominal_frequency(), 50.0);
    }

    #[test]
    fn test_from_record_rejects_other_types() {
        let record = Record::new(tags::RECORD_TYPE_BLANK);
        assert!(MonitorSettingsRecord::from_record(record).is_err());
    }
}
