//! Field descriptors and the field container.

use crate::types::TypeTag;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Describes one field of a record: name, wire type and numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    type_tag: TypeTag,
    id: i16,
}

impl Field {
    pub fn new(name: impl Into<String>, type_tag: TypeTag, id: i16) -> Self {
        Self {
            name: name.into(),
            type_tag,
            id,
        }
    }

    /// A descriptor with no name, the stop tag and id 0.
    ///
    /// Decoders produce this for the end-of-fields marker.
    pub fn anonymous() -> Self {
        Self::new("", TypeTag::Stop, 0)
    }

    /// A descriptor as seen on the wire, where names are not transmitted.
    pub fn unnamed(type_tag: TypeTag, id: i16) -> Self {
        Self::new("", type_tag, id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty() && self.type_tag == TypeTag::Stop && self.id == 0
    }

    /// Returns whether this descriptor marks the end of a field list.
    pub fn is_stop(&self) -> bool {
        self.type_tag == TypeTag::Stop
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fields order by id first.
impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.type_tag.cmp(&other.type_tag))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Field name:'{}' type:{} field-id:{}>",
            self.name, self.type_tag, self.id
        )
    }
}

/// An immutable set of field descriptors indexed by position, id and name.
///
/// When ids repeat, the last descriptor with a given id wins the id lookup.
/// Descriptors with an empty name are never reachable by name.
#[derive(Debug, Clone, Default)]
pub struct FieldContainer {
    fields: Vec<Field>,
    sorted: Vec<usize>,
    by_id: HashMap<i16, usize>,
    by_name: HashMap<String, usize>,
}

impl FieldContainer {
    pub fn new(fields: Vec<Field>) -> Self {
        let mut by_id = HashMap::with_capacity(fields.len());
        let mut by_name = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            by_id.insert(field.id, index);
            if !field.name.is_empty() {
                by_name.insert(field.name.clone(), index);
            }
        }

        let mut sorted: Vec<usize> = (0..fields.len()).collect();
        sorted.sort_by(|&a, &b| fields[a].cmp(&fields[b]));

        Self {
            fields,
            sorted,
            by_id,
            by_name,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Descriptor at insertion position `index`.
    pub fn at(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn by_id(&self, id: i16) -> Option<&Field> {
        self.by_id.get(&id).map(|&i| &self.fields[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&Field> {
        if name.is_empty() {
            return None;
        }
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Name of the field with `id`, or `""` when absent.
    pub fn field_name(&self, id: i16) -> &str {
        self.by_id(id).map(Field::name).unwrap_or("")
    }

    pub fn field_id(&self, name: &str) -> Option<i16> {
        self.by_name(name).map(Field::id)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Iterates in ascending id order.
    pub fn sorted(&self) -> impl Iterator<Item = &Field> + '_ {
        self.sorted.iter().map(move |&i| &self.fields[i])
    }
}

impl FromIterator<Field> for FieldContainer {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FieldContainer {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
