//! The closed list of well-known tag identifiers.
//!
//! Tags are opaque 128-bit identifiers; equality is bit equality. The
//! constants here are the identifiers the logical layer addresses record
//! children by, grouped by the record type that owns them, plus the record
//! signature and the record-type tags themselves. The byte layout on disk
//! is the Microsoft mixed-endian GUID layout (see [`crate::value`]).

use uuid::Uuid;

/// Record signature, the first 16 bytes of every record header.
pub const RECORD_SIGNATURE: Uuid = Uuid::from_u128(0x4a111440_e49f_11cf_9900_505144494600);

// ---------------------------------------------------------------
// Record type tags
// ---------------------------------------------------------------

/// Container record type.
pub const RECORD_TYPE_CONTAINER: Uuid = Uuid::from_u128(0x89738606_f1c3_11cf_9d89_0080c72e70a3);
/// Data source record type.
pub const RECORD_TYPE_DATA_SOURCE: Uuid = Uuid::from_u128(0x89738619_f1c3_11cf_9d89_0080c72e70a3);
/// Monitor settings record type.
pub const RECORD_TYPE_MONITOR_SETTINGS: Uuid =
    Uuid::from_u128(0xb48d8581_f5f5_11cf_9d89_0080c72e70a3);
/// Observation record type.
pub const RECORD_TYPE_OBSERVATION: Uuid = Uuid::from_u128(0x8973861a_f1c3_11cf_9d89_0080c72e70a3);
/// Blank record type; carries no body.
pub const RECORD_TYPE_BLANK: Uuid = Uuid::from_u128(0x89738618_f1c3_11cf_9d89_0080c72e70a3);

// ---------------------------------------------------------------
// Container record
// ---------------------------------------------------------------

/// Four-element UnsignedInteger4 vector: writer major/minor, compatible
/// major/minor.
pub const VERSION_INFO: Uuid = Uuid::from_u128(0x89738607_f1c3_11cf_9d89_0080c72e70a3);
/// Char1 vector holding the original file name.
pub const FILE_NAME: Uuid = Uuid::from_u128(0x89738608_f1c3_11cf_9d89_0080c72e70a3);
/// Timestamp scalar: when the file was created.
pub const CREATION: Uuid = Uuid::from_u128(0x89738609_f1c3_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar holding a `CompressionStyle` value.
pub const COMPRESSION_STYLE: Uuid = Uuid::from_u128(0x8973860d_f1c3_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar holding a `CompressionAlgorithm` value.
pub const COMPRESSION_ALGORITHM: Uuid = Uuid::from_u128(0x8973860e_f1c3_11cf_9d89_0080c72e70a3);

// ---------------------------------------------------------------
// Data source record
// ---------------------------------------------------------------

/// Guid scalar naming the data source type.
pub const DATA_SOURCE_TYPE_ID: Uuid = Uuid::from_u128(0xb48d8582_f5f5_11cf_9d89_0080c72e70a3);
/// Guid scalar naming the instrument vendor.
pub const VENDOR_ID: Uuid = Uuid::from_u128(0xb48d8583_f5f5_11cf_9d89_0080c72e70a3);
/// Guid scalar naming the instrument model.
pub const EQUIPMENT_ID: Uuid = Uuid::from_u128(0xb48d8584_f5f5_11cf_9d89_0080c72e70a3);
/// Char1 vector: human-readable data source name.
pub const DATA_SOURCE_NAME: Uuid = Uuid::from_u128(0xb48d8587_f5f5_11cf_9d89_0080c72e70a3);
/// Timestamp scalar: when this data source (or monitor settings) record
/// takes effect.
pub const EFFECTIVE: Uuid = Uuid::from_u128(0x62f28183_f9c4_11cf_9d89_0080c72e70a3);
/// Collection of channel definitions.
pub const CHANNEL_DEFINITIONS: Uuid = Uuid::from_u128(0xb48d8588_f5f5_11cf_9d89_0080c72e70a3);
/// One channel definition inside [`CHANNEL_DEFINITIONS`].
pub const ONE_CHANNEL_DEFINITION: Uuid = Uuid::from_u128(0xb48d8589_f5f5_11cf_9d89_0080c72e70a3);

// Channel definition children.

/// Char1 vector: channel name.
pub const CHANNEL_NAME: Uuid = Uuid::from_u128(0xb48d858d_f5f5_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: phase.
pub const PHASE_ID: Uuid = Uuid::from_u128(0xb48d858e_f5f5_11cf_9d89_0080c72e70a3);
/// Guid scalar: quantity type of the channel.
pub const QUANTITY_TYPE_ID: Uuid = Uuid::from_u128(0xb48d858f_f5f5_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: quantity measured (voltage, current, ...).
pub const QUANTITY_MEASURED_ID: Uuid = Uuid::from_u128(0xc3c5e860_f1c4_11cf_9d89_0080c72e70a3);
/// Collection of series definitions.
pub const SERIES_DEFINITIONS: Uuid = Uuid::from_u128(0xb48d8590_f5f5_11cf_9d89_0080c72e70a3);
/// One series definition inside [`SERIES_DEFINITIONS`].
pub const ONE_SERIES_DEFINITION: Uuid = Uuid::from_u128(0xb48d8591_f5f5_11cf_9d89_0080c72e70a3);

// Series definition children.

/// Guid scalar: what kind of values the series holds (time, value, min, ...).
pub const VALUE_TYPE_ID: Uuid = Uuid::from_u128(0xb48d859b_f5f5_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: engineering units of the series.
pub const QUANTITY_UNITS_ID: Uuid = Uuid::from_u128(0xb48d859c_f5f5_11cf_9d89_0080c72e70a3);
/// Guid scalar: quantity characteristic.
pub const QUANTITY_CHARACTERISTIC_ID: Uuid =
    Uuid::from_u128(0xb48d859d_f5f5_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: [`StorageMethods`](crate::tags) bit flags.
pub const STORAGE_METHOD_ID: Uuid = Uuid::from_u128(0xb48d859e_f5f5_11cf_9d89_0080c72e70a3);

// ---------------------------------------------------------------
// Monitor settings record
// ---------------------------------------------------------------

/// Timestamp scalar: when the monitor was installed.
pub const TIME_INSTALLED: Uuid = Uuid::from_u128(0x3d786f85_f76e_11cf_9d89_0080c72e70a3);
/// Boolean scalar: whether calibration settings apply.
pub const USE_CALIBRATION: Uuid = Uuid::from_u128(0x62f28180_f9c4_11cf_9d89_0080c72e70a3);
/// Boolean scalar: whether transducer ratios apply.
pub const USE_TRANSDUCER: Uuid = Uuid::from_u128(0x62f28181_f9c4_11cf_9d89_0080c72e70a3);
/// Collection of channel settings.
pub const CHANNEL_SETTINGS_ARRAY: Uuid = Uuid::from_u128(0x62f28182_f9c4_11cf_9d89_0080c72e70a3);
/// One channel setting inside [`CHANNEL_SETTINGS_ARRAY`].
pub const ONE_CHANNEL_SETTING: Uuid = Uuid::from_u128(0x3d786f9c_f76e_11cf_9d89_0080c72e70a3);
/// Real8 scalar: nominal line frequency.
pub const NOMINAL_FREQUENCY: Uuid = Uuid::from_u128(0x0fa118c3_cb4a_11d2_b30b_fe25cb9a1760);
/// Real8 scalar: transducer ratio, system side.
pub const XD_SYSTEM_SIDE_RATIO: Uuid = Uuid::from_u128(0x62f28186_f9c4_11cf_9d89_0080c72e70a3);
/// Real8 scalar: transducer ratio, monitor side.
pub const XD_MONITOR_SIDE_RATIO: Uuid = Uuid::from_u128(0x62f28187_f9c4_11cf_9d89_0080c72e70a3);

// ---------------------------------------------------------------
// Observation record
// ---------------------------------------------------------------

/// Char1 vector: observation name.
pub const OBSERVATION_NAME: Uuid = Uuid::from_u128(0x3d786f8a_f76e_11cf_9d89_0080c72e70a3);
/// Timestamp scalar: when the observation record was created.
pub const TIME_CREATE: Uuid = Uuid::from_u128(0x3d786f8b_f76e_11cf_9d89_0080c72e70a3);
/// Timestamp scalar: start of the observed interval.
pub const TIME_START: Uuid = Uuid::from_u128(0x3d786f8c_f76e_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: what triggered the observation.
pub const TRIGGER_METHOD: Uuid = Uuid::from_u128(0x3d786f8d_f76e_11cf_9d89_0080c72e70a3);
/// Timestamp scalar: the trigger instant.
pub const TIME_TRIGGERED: Uuid = Uuid::from_u128(0x3d786f8e_f76e_11cf_9d89_0080c72e70a3);
/// Guid scalar: IEEE 1159 disturbance category of the observation.
pub const DISTURBANCE_CATEGORY_ID: Uuid = Uuid::from_u128(0x3d786f8f_f76e_11cf_9d89_0080c72e70a3);
/// Collection of channel instances.
pub const CHANNEL_INSTANCES: Uuid = Uuid::from_u128(0x3d786f91_f76e_11cf_9d89_0080c72e70a3);
/// One channel instance inside [`CHANNEL_INSTANCES`].
pub const ONE_CHANNEL_INSTANCE: Uuid = Uuid::from_u128(0x3d786f92_f76e_11cf_9d89_0080c72e70a3);

// Channel instance and series instance children.

/// UnsignedInteger4 scalar: index of the channel definition (or, inside a
/// channel setting, the channel definition the setting applies to).
pub const CHANNEL_DEFINITION_INDEX: Uuid = Uuid::from_u128(0xb48d8580_f5f5_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: channel group.
pub const CHANNEL_GROUP_ID: Uuid = Uuid::from_u128(0x8973861b_f1c3_11cf_9d89_0080c72e70a3);
/// Collection of series instances.
pub const SERIES_INSTANCES: Uuid = Uuid::from_u128(0x3d786f93_f76e_11cf_9d89_0080c72e70a3);
/// One series instance inside [`SERIES_INSTANCES`].
pub const ONE_SERIES_INSTANCE: Uuid = Uuid::from_u128(0x3d786f94_f76e_11cf_9d89_0080c72e70a3);
/// Vector of stored series samples.
pub const SERIES_VALUES: Uuid = Uuid::from_u128(0x3d786f99_f76e_11cf_9d89_0080c72e70a3);
/// Scalar: multiplier applied to stored samples.
pub const SERIES_SCALE: Uuid = Uuid::from_u128(0x3d786f9a_f76e_11cf_9d89_0080c72e70a3);
/// Scalar: offset applied to stored samples.
pub const SERIES_OFFSET: Uuid = Uuid::from_u128(0x3d786f9b_f76e_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: channel index this series shares values with.
pub const SERIES_SHARE_CHANNEL_INDEX: Uuid =
    Uuid::from_u128(0x8973861f_f1c3_11cf_9d89_0080c72e70a3);
/// UnsignedInteger4 scalar: series index this series shares values with.
pub const SERIES_SHARE_SERIES_INDEX: Uuid =
    Uuid::from_u128(0x89738620_f1c3_11cf_9d89_0080c72e70a3);

/// Storage method bit flags stored under [`STORAGE_METHOD_ID`].
pub mod storage_methods {
    /// Samples are stored directly.
    pub const VALUES: u32 = 1;
    /// Stored samples are scaled: real value = offset + sample × scale.
    pub const SCALED: u32 = 2;
    /// Samples are run-length encoded as (count, increment) pairs.
    pub const INCREMENT: u32 = 4;
}

/// Well-known series value type identifiers stored under
/// [`VALUE_TYPE_ID`].
pub mod series_value_type {
    use uuid::Uuid;

    /// The series holds timestamps.
    pub const TIME: Uuid = Uuid::from_u128(0x67f6af90_f753_11cf_9d89_0080c72e70a3);
    /// The series holds measured values.
    pub const VAL: Uuid = Uuid::from_u128(0x67f6af91_f753_11cf_9d89_0080c72e70a3);
    /// Per-interval minimum.
    pub const MIN: Uuid = Uuid::from_u128(0x67f6af92_f753_11cf_9d89_0080c72e70a3);
    /// Per-interval maximum.
    pub const MAX: Uuid = Uuid::from_u128(0x67f6af93_f753_11cf_9d89_0080c72e70a3);
    /// Per-interval average.
    pub const AVG: Uuid = Uuid::from_u128(0x67f6af94_f753_11cf_9d89_0080c72e70a3);
}

/// Well-known quantity type identifiers stored under
/// [`QUANTITY_TYPE_ID`].
pub mod quantity_type {
    use uuid::Uuid;

    /// Sampled waveform.
    pub const WAVEFORM: Uuid = Uuid::from_u128(0x67f6af80_f753_11cf_9d89_0080c72e70a3);
    /// Phasor magnitudes and angles.
    pub const PHASOR: Uuid = Uuid::from_u128(0x67f6af81_f753_11cf_9d89_0080c72e70a3);
    /// Logged scalar values over time.
    pub const VALUE_LOG: Uuid = Uuid::from_u128(0x67f6af82_f753_11cf_9d89_0080c72e70a3);
    /// Magnitude/duration event pairs.
    pub const MAG_DUR: Uuid = Uuid::from_u128(0x67f6af83_f753_11cf_9d89_0080c72e70a3);
    /// Harmonic or interharmonic spectrum.
    pub const RESPONSE: Uuid = Uuid::from_u128(0x67f6af84_f753_11cf_9d89_0080c72e70a3);
}
