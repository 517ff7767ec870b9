//! The element sum type and element kinds.

use std::fmt;

use uuid::Uuid;

use crate::collection::CollectionElement;
use crate::error::Error;
use crate::scalar::ScalarElement;
use crate::vector::VectorElement;

/// Kind byte of an element header.
///
/// The discriminants are the on-disk byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementKind {
    Collection = 1,
    Scalar = 2,
    Vector = 3,
}

impl TryFrom<u8> for ElementKind {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(ElementKind::Collection),
            2 => Ok(ElementKind::Scalar),
            3 => Ok(ElementKind::Vector),
            other => Err(Error::UnknownElementKind(other)),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A node of the tagged element tree.
///
/// `Unknown` and `Error` only ever come out of the reader: `Unknown`
/// preserves the header of an element whose kind byte is unrecognized,
/// `Error` stands in for an element whose payload failed to parse so the
/// rest of the collection survives.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Scalar(ScalarElement),
    Vector(VectorElement),
    Collection(CollectionElement),
    Unknown {
        tag: Uuid,
        kind: u8,
        value_type: u8,
    },
    Error {
        tag: Uuid,
        kind: u8,
        value_type: u8,
        cause: String,
    },
}

impl Element {
    /// The element's tag.
    pub fn tag(&self) -> Uuid {
        match self {
            Element::Scalar(s) => s.tag,
            Element::Vector(v) => v.tag,
            Element::Collection(c) => c.tag,
            Element::Unknown { tag, .. } | Element::Error { tag, .. } => *tag,
        }
    }

    /// The element kind, when recognized.
    pub fn kind(&self) -> Option<ElementKind> {
        match self {
            Element::Scalar(_) => Some(ElementKind::Scalar),
            Element::Vector(_) => Some(ElementKind::Vector),
            Element::Collection(_) => Some(ElementKind::Collection),
            Element::Unknown { kind, .. } | Element::Error { kind, .. } => {
                ElementKind::try_from(*kind).ok()
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Element::Error { .. })
    }

    pub fn as_scalar(&self) -> Option<&ScalarElement> {
        match self {
            Element::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut ScalarElement> {
        match self {
            Element::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorElement> {
        match self {
            Element::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector_mut(&mut self) -> Option<&mut VectorElement> {
        match self {
            Element::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionElement> {
        match self {
            Element::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut CollectionElement> {
        match self {
            Element::Collection(c) => Some(c),
            _ => None,
        }
    }
}
