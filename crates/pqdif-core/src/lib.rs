//! Core types for PQDIF (IEEE 1159.3), the Power Quality Data Interchange Format.
//!
//! This crate defines everything below the record layer:
//!
//! - `physical_type`: the closed set of fixed-width value types a PQDIF file
//!   can store, with their on-disk byte sizes.
//! - `value`: a typed value (one variant per physical type) with the
//!   little-endian primitive codec and the narrow coercion surface.
//! - `timestamp`: the PQDIF (days since 1900, seconds since midnight)
//!   timestamp, including the two-day epoch correction the standard got wrong.
//! - `scalar` / `vector` / `collection` / `element`: the tagged element tree
//!   that record bodies decode into.
//! - `tags`: the closed list of well-known tag identifiers.
//!
//! Higher layers live in `pqdif-physical` (record framing) and
//! `pqdif-logical` (typed record views).

pub mod collection;
pub mod element;
pub mod error;
pub mod physical_type;
pub mod scalar;
pub mod tags;
pub mod timestamp;
pub mod value;
pub mod vector;

pub use collection::CollectionElement;
pub use element::{Element, ElementKind};
pub use error::{Error, Result};
pub use physical_type::PhysicalType;
pub use scalar::ScalarElement;
pub use timestamp::Timestamp;
pub use value::Value;
pub use vector::VectorElement;
