//! Thin caches over the registry for identifier-valued tags.
//!
//! Several well-known tags enumerate their valid values as identifiers:
//! quantity types, quantity characteristics, series value types, vendor
//! equipment, disturbance categories. Consumers resolve those identifiers
//! on every channel of every observation, so each enumeration gets a
//! cache holding the most recently observed `TagInfo` plus a map from
//! parsed identifier value to its entry. The cache invalidates itself by
//! pointer identity: when a registry refresh publishes a new `TagInfo`,
//! the map is rebuilt on the next lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use pqdif_core::tags;

use crate::registry::{self, IdentifierInfo, TagInfo};

/// A cache of one tag's identifier enumeration.
pub struct IdentifierCache {
    tag: Uuid,
    state: RwLock<Option<CacheState>>,
}

struct CacheState {
    info: Arc<TagInfo>,
    by_value: HashMap<Uuid, IdentifierInfo>,
}

impl IdentifierCache {
    pub const fn new(tag: Uuid) -> Self {
        IdentifierCache {
            tag,
            state: RwLock::new(None),
        }
    }

    /// The tag whose value space this cache serves.
    pub fn tag(&self) -> Uuid {
        self.tag
    }

    /// The current registry entry for the tag, if the document defines it.
    pub fn info(&self) -> Option<Arc<TagInfo>> {
        registry::get(self.tag)
    }

    /// Resolves an identifier value to its enumeration entry.
    pub fn find(&self, value: Uuid) -> Option<IdentifierInfo> {
        let info = registry::get(self.tag)?;

        {
            let guard = match self.state.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(state) = guard.as_ref() {
                if Arc::ptr_eq(&state.info, &info) {
                    return state.by_value.get(&value).cloned();
                }
            }
        }

        // The registry published a new tag object; rebuild the map.
        let by_value = index_identifiers(&info);
        let result = by_value.get(&value).cloned();
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(CacheState { info, by_value });
        result
    }

    /// Convenience: the human name of an identifier value.
    pub fn name_of(&self, value: Uuid) -> Option<String> {
        self.find(value).map(|entry| entry.name)
    }

    /// Whether the document lists this value as valid for the tag.
    pub fn is_defined(&self, value: Uuid) -> bool {
        self.find(value).is_some()
    }
}

fn index_identifiers(info: &TagInfo) -> HashMap<Uuid, IdentifierInfo> {
    info.valid_identifiers
        .iter()
        .filter_map(|entry| {
            Uuid::parse_str(&entry.value)
                .ok()
                .map(|value| (value, entry.clone()))
        })
        .collect()
}

/// Quantity types (waveform, phasor, value log, ...).
pub static QUANTITY_TYPE: IdentifierCache = IdentifierCache::new(tags::QUANTITY_TYPE_ID);

/// Quantity characteristics (rms, instantaneous, total, ...).
pub static QUANTITY_CHARACTERISTIC: IdentifierCache =
    IdentifierCache::new(tags::QUANTITY_CHARACTERISTIC_ID);

/// Series value types (time, value, min, max, avg, ...).
pub static SERIES_VALUE_TYPE: IdentifierCache = IdentifierCache::new(tags::VALUE_TYPE_ID);

/// Vendor equipment identifiers.
pub static EQUIPMENT: IdentifierCache = IdentifierCache::new(tags::EQUIPMENT_ID);

/// IEEE 1159 disturbance categories.
pub static DISTURBANCE_CATEGORY: IdentifierCache =
    IdentifierCache::new(tags::DISTURBANCE_CATEGORY_ID);
