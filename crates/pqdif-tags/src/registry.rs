//! The process-wide tag dictionary.
//!
//! ## Definition document
//!
//! The registry consumes an XML document with two sections: `<tags>`, one
//! `<tag>` entry per identifier (id, names, element kind, physical type,
//! required flag, optional format string), and `<tagValues>`, per-tag
//! enumerations of valid identifier values keyed by the tag's standard
//! name. The document is looked up as `TagDefinitions.xml` in the working
//! directory first; the copy bundled with this crate is the fallback.
//!
//! ## Concurrency
//!
//! The dictionary is published as an `Arc` snapshot behind an `RwLock`.
//! Lookups clone the `Arc` and read a consistent map with no further
//! locking; [`refresh`] parses the replacement document completely before
//! swapping the pointer, so a failed parse leaves the old map in place
//! and concurrent readers never observe a partially built one.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use pqdif_core::{ElementKind, PhysicalType};

use crate::error::{Error, Result};

/// File name the registry looks for in the working directory.
pub const TAG_DEFINITIONS_FILE: &str = "TagDefinitions.xml";

pub(crate) const BUNDLED_DEFINITIONS: &str = include_str!("../assets/TagDefinitions.xml");

/// Everything the definition document says about one tag.
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub id: Uuid,
    pub name: String,
    pub standard_name: String,
    pub description: String,
    pub element_kind: ElementKind,
    pub physical_type: Option<PhysicalType>,
    pub required: bool,
    pub format_string: Option<String>,
    /// Valid identifier values for this tag, when it has an enumeration.
    pub valid_identifiers: Vec<IdentifierInfo>,
}

/// One entry of a tag's value enumeration.
#[derive(Debug, Clone)]
pub struct IdentifierInfo {
    pub name: String,
    pub standard_name: String,
    /// The identifier value as written in the document (a GUID string for
    /// identifier-valued tags).
    pub value: String,
    pub description: String,
}

type TagMap = HashMap<Uuid, Arc<TagInfo>>;

static REGISTRY: Lazy<RwLock<Arc<TagMap>>> =
    Lazy::new(|| RwLock::new(Arc::new(initial_map())));

fn initial_map() -> TagMap {
    if let Ok(document) = std::fs::read_to_string(TAG_DEFINITIONS_FILE) {
        match parse_document(&document) {
            Ok(map) => {
                debug!(tags = map.len(), "loaded tag definitions from working directory");
                return map;
            }
            Err(e) => warn!(error = %e, "ignoring malformed {TAG_DEFINITIONS_FILE}"),
        }
    }
    match parse_document(BUNDLED_DEFINITIONS) {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "bundled tag definitions failed to parse");
            TagMap::new()
        }
    }
}

/// Current snapshot of the whole dictionary.
pub fn snapshot() -> Arc<TagMap> {
    match REGISTRY.read() {
        Ok(guard) => Arc::clone(&guard),
        Err(poisoned) => Arc::clone(&poisoned.into_inner()),
    }
}

/// Looks up one tag. O(1) after the first call.
pub fn get(id: Uuid) -> Option<Arc<TagInfo>> {
    snapshot().get(&id).cloned()
}

/// Replaces the dictionary with the given definition document.
///
/// The swap is atomic: in-flight lookups finish against the map they
/// started with, and a parse failure leaves the current map untouched.
pub fn refresh(document: &str) -> Result<()> {
    let map = Arc::new(parse_document(document)?);
    match REGISTRY.write() {
        Ok(mut guard) => *guard = map,
        Err(poisoned) => *poisoned.into_inner() = map,
    }
    Ok(())
}

// ---------------------------------------------------------------
// Document model
// ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Document {
    tags: TagsSection,
    #[serde(rename = "tagValues", default)]
    tag_values: TagValuesSection,
}

#[derive(Debug, Deserialize, Default)]
struct TagsSection {
    #[serde(rename = "tag", default)]
    entries: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    id: String,
    name: String,
    #[serde(rename = "standardName")]
    standard_name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "elementType")]
    element_type: String,
    #[serde(rename = "physicalType", default)]
    physical_type: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(rename = "formatString", default)]
    format_string: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TagValuesSection {
    #[serde(rename = "valueSet", default)]
    sets: Vec<ValueSet>,
}

#[derive(Debug, Deserialize)]
struct ValueSet {
    #[serde(rename = "@standardName")]
    standard_name: String,
    #[serde(rename = "value", default)]
    entries: Vec<ValueEntry>,
}

#[derive(Debug, Deserialize)]
struct ValueEntry {
    name: String,
    #[serde(rename = "standardName")]
    standard_name: String,
    value: String,
    #[serde(default)]
    description: String,
}

fn parse_document(document: &str) -> Result<TagMap> {
    let parsed: Document =
        quick_xml::de::from_str(document).map_err(|e| Error::Xml(e.to_string()))?;

    // Value enumerations attach to tags by standard name.
    let mut values_by_standard_name: HashMap<String, Vec<IdentifierInfo>> = HashMap::new();
    for set in parsed.tag_values.sets {
        let identifiers = set
            .entries
            .into_iter()
            .map(|entry| IdentifierInfo {
                name: entry.name,
                standard_name: entry.standard_name,
                value: entry.value,
                description: entry.description,
            })
            .collect();
        values_by_standard_name.insert(set.standard_name, identifiers);
    }

    let mut map = TagMap::new();
    for entry in parsed.tags.entries {
        let id = Uuid::parse_str(&entry.id).map_err(|_| {
            Error::InvalidTagDocument(format!("tag {} has a malformed id: {}", entry.name, entry.id))
        })?;
        let element_kind = parse_element_kind(&entry.element_type)?;
        let physical_type = entry
            .physical_type
            .as_deref()
            .map(parse_physical_type)
            .transpose()?;
        let valid_identifiers = values_by_standard_name
            .remove(&entry.standard_name)
            .unwrap_or_default();

        map.insert(
            id,
            Arc::new(TagInfo {
                id,
                name: entry.name,
                standard_name: entry.standard_name,
                description: entry.description,
                element_kind,
                physical_type,
                required: entry.required,
                format_string: entry.format_string,
                valid_identifiers,
            }),
        );
    }
    Ok(map)
}

fn parse_element_kind(name: &str) -> Result<ElementKind> {
    match name {
        "Collection" => Ok(ElementKind::Collection),
        "Scalar" => Ok(ElementKind::Scalar),
        "Vector" => Ok(ElementKind::Vector),
        other => Err(Error::InvalidTagDocument(format!(
            "unknown element type: {other}"
        ))),
    }
}

fn parse_physical_type(name: &str) -> Result<PhysicalType> {
    let ty = match name {
        "Boolean1" => PhysicalType::Boolean1,
        "Boolean2" => PhysicalType::Boolean2,
        "Boolean4" => PhysicalType::Boolean4,
        "Char1" => PhysicalType::Char1,
        "Char2" => PhysicalType::Char2,
        "Integer1" => PhysicalType::Integer1,
        "Integer2" => PhysicalType::Integer2,
        "Integer4" => PhysicalType::Integer4,
        "UnsignedInteger1" => PhysicalType::UnsignedInteger1,
        "UnsignedInteger2" => PhysicalType::UnsignedInteger2,
        "UnsignedInteger4" => PhysicalType::UnsignedInteger4,
        "Real4" => PhysicalType::Real4,
        "Real8" => PhysicalType::Real8,
        "Complex8" => PhysicalType::Complex8,
        "Complex16" => PhysicalType::Complex16,
        "Timestamp" => PhysicalType::Timestamp,
        "Guid" => PhysicalType::Guid,
        other => {
            return Err(Error::InvalidTagDocument(format!(
                "unknown physical type: {other}"
            )))
        }
    };
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::REGISTRY_GUARD;
    use pqdif_core::tags;

    #[test]
    fn test_bundled_document_parses() {
        let map = parse_document(BUNDLED_DEFINITIONS).unwrap();
        assert!(map.len() > 30);

        let info = map.get(&tags::VERSION_INFO).unwrap();
        assert_eq!(info.element_kind, ElementKind::Vector);
        assert_eq!(info.physical_type, Some(PhysicalType::UnsignedInteger4));
        assert!(info.required);

        let quantity = map.get(&tags::QUANTITY_TYPE_ID).unwrap();
        assert_eq!(quantity.element_kind, ElementKind::Scalar);
        assert_eq!(quantity.physical_type, Some(PhysicalType::Guid));
        assert!(!quantity.valid_identifiers.is_empty());
    }

    #[test]
    fn test_lookup_and_refresh() {
        let _guard = REGISTRY_GUARD.lock().unwrap();
        refresh(BUNDLED_DEFINITIONS).unwrap();

        let info = get(tags::FILE_NAME).unwrap();
        assert_eq!(info.standard_name, "tagFileName");

        // Replace the dictionary with a single-entry document.
        let tiny = r#"
            <pqdifTagDefinitions>
              <tags>
                <tag>
                  <id>89738608-f1c3-11cf-9d89-0080c72e70a3</id>
                  <name>Renamed File Name</name>
                  <standardName>tagFileName</standardName>
                  <elementType>Vector</elementType>
                  <physicalType>Char1</physicalType>
                  <required>true</required>
                </tag>
              </tags>
            </pqdifTagDefinitions>
        "#;
        refresh(tiny).unwrap();
        assert_eq!(get(tags::FILE_NAME).unwrap().name, "Renamed File Name");
        assert!(get(tags::VERSION_INFO).is_none());

        // A failed refresh leaves the current map in place.
        assert!(refresh("<pqdifTagDefinitions><tags><tag><id>nope</id>").is_err());
        assert_eq!(get(tags::FILE_NAME).unwrap().name, "Renamed File Name");

        refresh(BUNDLED_DEFINITIONS).unwrap();
        assert!(get(tags::VERSION_INFO).is_some());
    }

    #[test]
    fn test_snapshot_is_stable_across_refresh() {
        let _guard = REGISTRY_GUARD.lock().unwrap();
        refresh(BUNDLED_DEFINITIONS).unwrap();
        let before = snapshot();
        let count_before = before.len();
        refresh(BUNDLED_DEFINITIONS).unwrap();
        // The held snapshot still reads the map it started with.
        assert_eq!(before.len(), count_before);
        assert!(before.contains_key(&tags::CREATION));
    }

    #[test]
    fn test_malformed_documents_rejected() {
        assert!(parse_document("not xml at all").is_err());

        let bad_kind = r#"
            <pqdifTagDefinitions>
              <tags>
                <tag>
                  <id>89738608-f1c3-11cf-9d89-0080c72e70a3</id>
                  <name>X</name>
                  <standardName>tagX</standardName>
                  <elementType>Widget</elementType>
                </tag>
              </tags>
            </pqdifTagDefinitions>
        "#;
        assert!(matches!(
            parse_document(bad_kind),
            Err(Error::InvalidTagDocument(_))
        ));
    }
}
