//! Record schemas and collection headers.

use crate::field::{Field, FieldContainer};
use crate::types::TypeTag;
use std::fmt;

/// Named, immutable description of a record type. Holds no values.
#[derive(Debug, Clone, Default)]
pub struct StructSchema {
    name: String,
    fields: FieldContainer,
}

impl StructSchema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields: FieldContainer::new(fields),
        }
    }

    /// A schema with no fields.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldContainer {
        &self.fields
    }

    pub fn field(&self, id: i16) -> Option<&Field> {
        self.fields.by_id(id)
    }

    pub fn field_named(&self, name: &str) -> Option<&Field> {
        self.fields.by_name(name)
    }
}

impl fmt::Display for StructSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Header preceding the entries of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key_type: TypeTag,
    pub value_type: TypeTag,
    pub size: usize,
}

impl MapHeader {
    pub fn new(key_type: TypeTag, value_type: TypeTag, size: usize) -> Self {
        Self {
            key_type,
            value_type,
            size,
        }
    }
}

/// Header preceding the elements of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub element_type: TypeTag,
    pub size: usize,
}

impl ListHeader {
    pub fn new(element_type: TypeTag, size: usize) -> Self {
        Self { element_type, size }
    }
}

/// Header preceding the elements of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetHeader {
    pub element_type: TypeTag,
    pub size: usize,
}

impl SetHeader {
    pub fn new(element_type: TypeTag, size: usize) -> Self {
        Self { element_type, size }
    }
}
