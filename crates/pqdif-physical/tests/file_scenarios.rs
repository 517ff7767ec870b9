//! End-to-end physical-layer scenarios: whole files written, then read
//! back byte-for-byte through the parser.

use adler32::RollingAdler32;
use bytes::Bytes;
use uuid::Uuid;

use pqdif_core::{
    tags, CollectionElement, Element, PhysicalType, ScalarElement, Value, VectorElement,
};
use pqdif_physical::{
    CompressionAlgorithm, CompressionStyle, Parser, Record, RecordHeader, RecordType, Writer,
    RECORD_HEADER_SIZE,
};

fn tag(n: u8) -> Uuid {
    Uuid::from_u128(n as u128)
}

fn observation_with(elements: Vec<Element>) -> Record {
    let mut record = Record::new(tags::RECORD_TYPE_OBSERVATION);
    let body = record.body.as_mut().unwrap();
    for element in elements {
        body.add(element);
    }
    record
}

// ---------------------------------------------------------------
// Scenario: one embedded scalar
// ---------------------------------------------------------------

#[test]
fn embedded_scalar_record_is_32_bytes_of_body() {
    let mut writer = Writer::new();
    let mut container = Record::new(tags::RECORD_TYPE_CONTAINER);
    writer.write_record(&mut container, false).unwrap();

    let mut observation = observation_with(vec![Element::Scalar(ScalarElement::with_value(
        tag(7),
        Value::UnsignedInteger1(0x2A),
    ))]);
    writer.write_record(&mut observation, true).unwrap();
    // 4 bytes of count plus one 28-byte header, no linked payloads.
    assert_eq!(observation.header.body_size, 32);

    let mut parser = Parser::new(writer.into_bytes());
    parser.next_record().unwrap().unwrap();
    let record = parser.next_record().unwrap().unwrap();
    let body = record.body.unwrap();
    assert_eq!(
        body.get_scalar_by_tag(tag(7)).unwrap().get().unwrap(),
        Value::UnsignedInteger1(0x2A)
    );
}

// ---------------------------------------------------------------
// Scenario: one vector of Real4
// ---------------------------------------------------------------

#[test]
fn real4_vector_round_trips_with_expected_sizes() {
    let mut vector = VectorElement::new(tag(9), PhysicalType::Real4);
    vector
        .set_values(&[Value::Real4(1.0), Value::Real4(2.0), Value::Real4(3.0)])
        .unwrap();

    let mut writer = Writer::new();
    let mut record = observation_with(vec![Element::Vector(vector)]);
    writer.write_record(&mut record, true).unwrap();
    // body = count + header + (4 + 12) payload.
    assert_eq!(record.header.body_size, 48);

    let mut parser = Parser::new(writer.into_bytes());
    let body = parser.next_record().unwrap().unwrap().body.unwrap();
    let decoded = body.get_vector_by_tag(tag(9)).unwrap();
    assert_eq!(decoded.size(), 3);
    assert_eq!(decoded.get(0).unwrap(), Value::Real4(1.0));
    assert_eq!(decoded.get(1).unwrap(), Value::Real4(2.0));
    assert_eq!(decoded.get(2).unwrap(), Value::Real4(3.0));
}

// ---------------------------------------------------------------
// Scenario: checksum mismatch is surfaced, not fatal
// ---------------------------------------------------------------

#[test]
fn flipped_body_byte_yields_tree_and_checksum_discrepancy() {
    let mut writer = Writer::new();
    let mut record = observation_with(vec![Element::Scalar(ScalarElement::with_value(
        tag(7),
        Value::UnsignedInteger1(1),
    ))]);
    writer.write_record(&mut record, true).unwrap();

    let mut raw = writer.into_bytes().to_vec();
    // Flip a bit inside the inline payload of the only element.
    let flip_at = RECORD_HEADER_SIZE + 4 + 20;
    raw[flip_at] ^= 0x01;

    let mut parser = Parser::new(Bytes::from(raw));
    let parsed = parser.next_record().unwrap().unwrap();
    // The tree still parses, but the caller can see the corruption.
    assert!(parsed.body.is_some());
    assert!(!parsed.checksum_matches());
}

// ---------------------------------------------------------------
// Scenario: cycle file
// ---------------------------------------------------------------

#[test]
fn cyclic_next_pointers_terminate_iteration() {
    // Offset 0 doubles as the end-of-chain marker, so the smallest true
    // cycle chains three records: 0 → 1 → 2 → 1.
    let body = pqdif_physical::writer::serialize_body(&CollectionElement::new(
        tags::RECORD_TYPE_OBSERVATION,
    ))
    .unwrap();
    let record_len = RECORD_HEADER_SIZE + body.len();
    let checksum = RollingAdler32::from_buffer(&body).hash();

    let mut raw = Vec::new();
    for next in [record_len, 2 * record_len, record_len] {
        let mut header = RecordHeader::new(tags::RECORD_TYPE_OBSERVATION);
        header.body_size = body.len() as i32;
        header.next_record_position = next as i32;
        header.checksum = checksum;
        header.encode(&mut raw);
        raw.extend_from_slice(&body);
    }

    let mut parser = Parser::new(Bytes::from(raw));
    let mut yielded = 0;
    while let Some(record) = parser.next_record().unwrap() {
        assert_eq!(record.record_type(), RecordType::Observation);
        yielded += 1;
        assert!(yielded <= 3, "cycle guard failed to terminate");
    }
    // Each offset yields exactly once; the pointer back to the middle
    // record is refused.
    assert_eq!(yielded, 3);
}

// ---------------------------------------------------------------
// Scenario: zlib record-level compression
// ---------------------------------------------------------------

#[test]
fn zlib_compressed_record_round_trips() {
    let mut writer = Writer::new();
    let mut container = Record::new(tags::RECORD_TYPE_CONTAINER);
    writer.write_record(&mut container, false).unwrap();
    writer
        .set_compression(CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel)
        .unwrap();

    let mut values = VectorElement::new(tag(9), PhysicalType::Real8);
    values
        .set_values(&vec![Value::Real8(60.0); 500])
        .unwrap();
    let uncompressed_payload = 4 + 500 * 8;
    let mut observation = observation_with(vec![Element::Vector(values)]);
    writer.write_record(&mut observation, true).unwrap();

    // The header's body size is the compressed length.
    assert!(observation.header.body_size > 0);
    assert!((observation.header.body_size as usize) < uncompressed_payload);

    let data = writer.into_bytes();

    // The stored checksum covers the compressed bytes as written.
    let body_start = 2 * RECORD_HEADER_SIZE + 4;
    let body_end = body_start + observation.header.body_size as usize;
    assert_eq!(
        RollingAdler32::from_buffer(&data[body_start..body_end]).hash(),
        observation.header.checksum
    );

    let mut parser = Parser::new(data);
    parser.next_record().unwrap().unwrap();
    parser
        .set_compression(CompressionAlgorithm::Zlib, CompressionStyle::RecordLevel)
        .unwrap();
    let record = parser.next_record().unwrap().unwrap();
    assert!(record.checksum_matches());
    let body = record.body.unwrap();
    let decoded = body.get_vector_by_tag(tag(9)).unwrap();
    assert_eq!(decoded.size(), 500);
    assert_eq!(decoded.get(499).unwrap(), Value::Real8(60.0));
}

// ---------------------------------------------------------------
// Round-trip property over a nested tree
// ---------------------------------------------------------------

#[test]
fn nested_tree_round_trips_exactly() {
    let mut series = CollectionElement::new(tags::ONE_SERIES_INSTANCE);
    let mut values = VectorElement::new(tags::SERIES_VALUES, PhysicalType::Integer2);
    values
        .set_values(&[
            Value::Integer2(-1),
            Value::Integer2(0),
            Value::Integer2(32767),
        ])
        .unwrap();
    series.add(Element::Vector(values));
    series.add(Element::Scalar(ScalarElement::with_value(
        tags::SERIES_SCALE,
        Value::Real8(0.1),
    )));

    let mut channel = CollectionElement::new(tags::ONE_CHANNEL_INSTANCE);
    channel.add(Element::Scalar(ScalarElement::with_value(
        tags::CHANNEL_DEFINITION_INDEX,
        Value::UnsignedInteger4(0),
    )));
    let mut instances = CollectionElement::new(tags::SERIES_INSTANCES);
    instances.add(Element::Collection(series));
    channel.add(Element::Collection(instances));

    let mut root = CollectionElement::new(tags::RECORD_TYPE_OBSERVATION);
    let mut channels = CollectionElement::new(tags::CHANNEL_INSTANCES);
    channels.add(Element::Collection(channel));
    root.add(Element::Collection(channels));
    root.add(Element::Scalar(ScalarElement::with_value(
        tags::TIME_CREATE,
        Value::Timestamp(pqdif_core::Timestamp {
            days: 45_000,
            seconds: 1.5,
        }),
    )));

    let mut record = Record::new(tags::RECORD_TYPE_OBSERVATION);
    record.body = Some(root.clone());
    let mut writer = Writer::new();
    writer.write_record(&mut record, true).unwrap();

    let mut parser = Parser::new(writer.into_bytes());
    let parsed = parser.next_record().unwrap().unwrap();
    assert!(parser.errors().is_empty());
    assert_eq!(parsed.body.unwrap(), root);
}

// ---------------------------------------------------------------
// Deterministic output
// ---------------------------------------------------------------

#[test]
fn encoding_is_deterministic() {
    let build = || {
        let mut writer = Writer::new();
        let mut record = observation_with(vec![Element::Scalar(ScalarElement::with_value(
            tag(1),
            Value::Complex16(1.0, -1.0),
        ))]);
        writer.write_record(&mut record, true).unwrap();
        writer.into_bytes()
    };
    assert_eq!(build(), build());
}

// ---------------------------------------------------------------
// File boundary
// ---------------------------------------------------------------

#[tokio::test]
async fn save_and_open_through_the_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roundtrip.pqd");

    let mut writer = Writer::new();
    let mut record = observation_with(vec![Element::Scalar(ScalarElement::with_value(
        tag(4),
        Value::Guid(tags::RECORD_SIGNATURE),
    ))]);
    writer.write_record(&mut record, true).unwrap();
    writer.save(&path).await.unwrap();

    let mut parser = Parser::open(&path).await.unwrap();
    let parsed = parser.next_record().unwrap().unwrap();
    assert_eq!(
        parsed
            .body
            .unwrap()
            .get_scalar_by_tag(tag(4))
            .unwrap()
            .get_uuid()
            .unwrap(),
        tags::RECORD_SIGNATURE
    );
}
