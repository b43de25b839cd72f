//! Element storage and typed value access.
//!
//! A [`DataSet`] keeps each element's raw value bytes as they appear in the
//! file, together with the byte order they were written in. Accessors decode
//! on demand and report the offending attribute by name when a value cannot
//! be interpreted.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::ParseError;
use crate::io::ByteOrder;

use super::dictionary::{tags, Tag, Vr};

// =============================================================================
// Element
// =============================================================================

/// Value of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw value bytes, in the byte order of the enclosing data set
    Bytes(Bytes),
    /// Items of a sequence
    Sequence(Vec<DataSet>),
}

/// A single parsed element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub vr: Vr,
    pub value: Value,
}

// =============================================================================
// DataSet
// =============================================================================

/// Elements of a data set or sequence item, ordered by tag.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    byte_order: ByteOrder,
    elements: BTreeMap<Tag, Element>,
}

impl DataSet {
    /// Create an empty data set whose binary values use `byte_order`.
    pub fn new(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            elements: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Insert an element, replacing any previous element with the same tag.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.tag, element);
    }

    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over elements in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Raw value bytes of a non-sequence element.
    pub fn bytes(&self, tag: Tag) -> Option<&Bytes> {
        match &self.get(tag)?.value {
            Value::Bytes(bytes) => Some(bytes),
            Value::Sequence(_) => None,
        }
    }

    /// Items of a sequence element.
    pub fn sequence(&self, tag: Tag) -> Option<&[DataSet]> {
        match &self.get(tag)?.value {
            Value::Sequence(items) => Some(items),
            Value::Bytes(_) => None,
        }
    }

    // -------------------------------------------------------------------------
    // Typed Accessors
    // -------------------------------------------------------------------------

    /// Read the first value of a US element.
    pub fn get_u16(&self, tag: Tag, name: &'static str) -> Result<Option<u16>, ParseError> {
        let Some(bytes) = self.bytes(tag) else {
            return Ok(None);
        };
        if bytes.len() < 2 {
            return Err(invalid(name, tag, format!("expected 2 bytes, got {}", bytes.len())));
        }
        Ok(Some(self.byte_order.read_u16(bytes)))
    }

    /// Read the first value of an integer element.
    ///
    /// Binary (US, SS, UL, SL) and integer string (IS) encodings are accepted,
    /// since private attributes are not always written with the same VR.
    pub fn get_integer(&self, tag: Tag, name: &'static str) -> Result<Option<i64>, ParseError> {
        let Some(element) = self.get(tag) else {
            return Ok(None);
        };
        let Value::Bytes(bytes) = &element.value else {
            return Err(invalid(name, tag, "expected a value, found a sequence".to_string()));
        };

        let width = match element.vr {
            Vr::US | Vr::SS => 2,
            Vr::UL | Vr::SL => 4,
            Vr::IS | Vr::DS => {
                return match first_text_value(bytes) {
                    None => Ok(None),
                    Some(text) => text
                        .parse::<i64>()
                        .map(Some)
                        .map_err(|e| invalid(name, tag, format!("{:?}: {}", text, e))),
                };
            }
            other => {
                return Err(invalid(name, tag, format!("unexpected VR {:?}", other)));
            }
        };

        if bytes.len() < width {
            return Err(invalid(
                name,
                tag,
                format!("expected {} bytes, got {}", width, bytes.len()),
            ));
        }

        let order = self.byte_order;
        let value = match element.vr {
            Vr::US => i64::from(order.read_u16(bytes)),
            Vr::SS => i64::from(order.read_u16(bytes) as i16),
            Vr::UL => i64::from(order.read_u32(bytes)),
            _ => i64::from(order.read_i32(bytes)),
        };
        Ok(Some(value))
    }

    /// Read all values of a decimal string (DS) element.
    ///
    /// Returns `None` if the element is absent or has an empty value.
    pub fn get_decimals(
        &self,
        tag: Tag,
        name: &'static str,
    ) -> Result<Option<Vec<f64>>, ParseError> {
        let Some(bytes) = self.bytes(tag) else {
            return Ok(None);
        };
        let text = decode_text(bytes);
        if text.is_empty() {
            return Ok(None);
        }

        text.split('\\')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .map_err(|e| invalid(name, tag, format!("{:?}: {}", part, e)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Read exactly `count` decimal values, or `None` if the element is absent.
    pub fn get_decimal_array<const N: usize>(
        &self,
        tag: Tag,
        name: &'static str,
    ) -> Result<Option<[f64; N]>, ParseError> {
        let Some(values) = self.get_decimals(tag, name)? else {
            return Ok(None);
        };
        let array: [f64; N] = values.as_slice().try_into().map_err(|_| {
            invalid(
                name,
                tag,
                format!("expected {} values, got {}", N, values.len()),
            )
        })?;
        Ok(Some(array))
    }

    /// Read a text value with padding removed.
    pub fn get_string(&self, tag: Tag) -> Option<String> {
        self.bytes(tag).map(|bytes| decode_text(bytes))
    }

    // -------------------------------------------------------------------------
    // Functional Groups
    // -------------------------------------------------------------------------

    /// Locate the first item of a functional group macro sequence.
    ///
    /// Enhanced multi-frame objects move per-image attributes into
    /// functional group macros. The shared group is searched first, then the
    /// first frame of the per-frame group.
    pub fn functional_group_item(&self, macro_sequence: Tag) -> Option<&DataSet> {
        [tags::SHARED_FUNCTIONAL_GROUPS, tags::PER_FRAME_FUNCTIONAL_GROUPS]
            .into_iter()
            .filter_map(|group| self.sequence(group)?.first())
            .find_map(|frame| frame.sequence(macro_sequence)?.first())
    }
}

/// Decode text bytes, trimming NUL and space padding.
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// First backslash-separated value of a text element, if not empty.
fn first_text_value(bytes: &[u8]) -> Option<String> {
    let text = decode_text(bytes);
    let first = text.split('\\').next()?.trim().to_string();
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

fn invalid(name: &'static str, tag: Tag, message: String) -> ParseError {
    ParseError::InvalidValue { name, tag, message }
}

// =============================================================================
// Tests
// =============================================================================
