//! Collection elements.

use uuid::Uuid;

use crate::element::Element;
use crate::physical_type::PhysicalType;
use crate::scalar::ScalarElement;
use crate::vector::VectorElement;

/// A tagged, ordered list of child elements.
///
/// Children keep insertion order; tag lookup walks the list in order, so
/// "first match" semantics are stable. A collection owns its children
/// outright: the tree is strictly parent → child, no back-pointers.
#[derive(Debug, Clone)]
pub struct CollectionElement {
    /// Tag identifying what this collection means.
    pub tag: Uuid,
    elements: Vec<Element>,
    read_size: usize,
}

/// Equality compares the tag and children only. `read_size` is bookkeeping
/// from the reader and irrelevant to whether two trees hold the same data.
impl PartialEq for CollectionElement {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.elements == other.elements
    }
}

impl CollectionElement {
    /// Creates an empty collection.
    pub fn new(tag: Uuid) -> Self {
        CollectionElement {
            tag,
            elements: Vec::new(),
            read_size: 0,
        }
    }

    /// The child count stored in the file.
    ///
    /// For parsed collections this may exceed [`len`](Self::len) when the
    /// stream ended mid-parse; for programmatically built collections it is
    /// meaningless and stays zero.
    pub fn read_size(&self) -> usize {
        self.read_size
    }

    /// Records the child count the file declared. Used by the reader.
    pub fn set_read_size(&mut self, read_size: usize) {
        self.read_size = read_size;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    /// Appends a child.
    pub fn add(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Removes and returns the child at `index`.
    pub fn remove(&mut self, index: usize) -> Element {
        self.elements.remove(index)
    }

    /// Removes every child with the given tag.
    pub fn remove_by_tag(&mut self, tag: Uuid) {
        self.elements.retain(|e| e.tag() != tag);
    }

    /// All children with the given tag, in insertion order.
    pub fn get_all_by_tag(&self, tag: Uuid) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.tag() == tag)
    }

    /// First child with the given tag, if any.
    pub fn get_by_tag(&self, tag: Uuid) -> Option<&Element> {
        self.elements.iter().find(|e| e.tag() == tag)
    }

    /// First scalar child with the given tag, if any.
    pub fn get_scalar_by_tag(&self, tag: Uuid) -> Option<&ScalarElement> {
        self.elements
            .iter()
            .find_map(|e| e.as_scalar().filter(|s| s.tag == tag))
    }

    pub fn get_scalar_by_tag_mut(&mut self, tag: Uuid) -> Option<&mut ScalarElement> {
        self.elements
            .iter_mut()
            .find_map(|e| e.as_scalar_mut().filter(|s| s.tag == tag))
    }

    /// First vector child with the given tag, if any.
    pub fn get_vector_by_tag(&self, tag: Uuid) -> Option<&VectorElement> {
        self.elements
            .iter()
            .find_map(|e| e.as_vector().filter(|v| v.tag == tag))
    }

    pub fn get_vector_by_tag_mut(&mut self, tag: Uuid) -> Option<&mut VectorElement> {
        self.elements
            .iter_mut()
            .find_map(|e| e.as_vector_mut().filter(|v| v.tag == tag))
    }

    /// First collection child with the given tag, if any.
    pub fn get_collection_by_tag(&self, tag: Uuid) -> Option<&CollectionElement> {
        self.elements
            .iter()
            .find_map(|e| e.as_collection().filter(|c| c.tag == tag))
    }

    pub fn get_collection_by_tag_mut(&mut self, tag: Uuid) -> Option<&mut CollectionElement> {
        self.elements
            .iter_mut()
            .find_map(|e| e.as_collection_mut().filter(|c| c.tag == tag))
    }

    /// First scalar child with the given tag, appending a fresh one if absent.
    pub fn get_or_add_scalar(&mut self, tag: Uuid) -> &mut ScalarElement {
        let position = self
            .elements
            .iter()
            .position(|e| matches!(e, Element::Scalar(s) if s.tag == tag));
        let index = match position {
            Some(index) => index,
            None => {
                self.elements.push(Element::Scalar(ScalarElement::new(
                    tag,
                    PhysicalType::UnsignedInteger1,
                )));
                self.elements.len() - 1
            }
        };
        match &mut self.elements[index] {
            Element::Scalar(s) => s,
            _ => unreachable!("index points at a scalar"),
        }
    }

    /// First vector child with the given tag, appending a fresh one if absent.
    pub fn get_or_add_vector(&mut self, tag: Uuid) -> &mut VectorElement {
        let position = self
            .elements
            .iter()
            .position(|e| matches!(e, Element::Vector(v) if v.tag == tag));
        let index = match position {
            Some(index) => index,
            None => {
                self.elements.push(Element::Vector(VectorElement::new(
                    tag,
                    PhysicalType::UnsignedInteger1,
                )));
                self.elements.len() - 1
            }
        };
        match &mut self.elements[index] {
            Element::Vector(v) => v,
            _ => unreachable!("index points at a vector"),
        }
    }

    /// First collection child with the given tag, appending an empty one if
    /// absent.
    pub fn get_or_add_collection(&mut self, tag: Uuid) -> &mut CollectionElement {
        let position = self
            .elements
            .iter()
            .position(|e| matches!(e, Element::Collection(c) if c.tag == tag));
        let index = match position {
            Some(index) => index,
            None => {
                self.elements
                    .push(Element::Collection(CollectionElement::new(tag)));
                self.elements.len() - 1
            }
        };
        match &mut self.elements[index] {
            Element::Collection(c) => c,
            _ => unreachable!("index points at a collection"),
        }
    }
}
