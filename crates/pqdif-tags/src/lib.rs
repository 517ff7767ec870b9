//! The PQDIF tag registry.
//!
//! Tags are opaque identifiers. What they *mean* (a human name, the
//! element kind and physical type a well-formed file stores under them,
//! the enumeration of valid identifier values) lives in an external XML
//! definition document. This crate loads that document into a
//! process-wide, thread-safe dictionary ([`registry`]) and layers thin
//! per-enumeration caches over it ([`semantics`]) for the value spaces
//! consumers look up constantly: quantity types, quantity
//! characteristics, series value types, equipment, and disturbance
//! categories.
//!
//! The registry initializes lazily on first lookup, preferring a
//! `TagDefinitions.xml` in the working directory over the bundled copy,
//! and [`registry::refresh`] atomically publishes a replacement map so
//! concurrent lookups see either the old document or the new one, never a
//! mix.

pub mod error;
pub mod registry;
pub mod semantics;

pub use error::{Error, Result};
pub use registry::{IdentifierInfo, TagInfo};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    /// Tests that refresh the process-global registry serialize on this.
    pub static REGISTRY_GUARD: Mutex<()> = Mutex::new(());
}
