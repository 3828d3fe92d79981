use std::{
    borrow::Cow,
    collections::btree_map::{self, BTreeMap},
};

use crate::{FieldDescriptor, Value};

use super::unknown::{UnknownField, UnknownFieldSet};

/// Storage for the set fields of a dynamic message.
///
/// Known fields are keyed by number; presence is membership in the map, so a
/// field set to its default value is still present. Unknown fields captured
/// during a decode live beside the known values and are re-emitted after
/// them.
#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct DynamicMessageFieldSet {
    values: BTreeMap<u32, Value>,
    unknown: UnknownFieldSet,
}

impl DynamicMessageFieldSet {
    pub(super) fn value(&self, number: u32) -> Option<&Value> {
        self.values.get(&number)
    }

    pub(super) fn has(&self, desc: &FieldDescriptor) -> bool {
        self.values.contains_key(&desc.number())
    }

    pub(super) fn get(&self, desc: &FieldDescriptor) -> Cow<'_, Value> {
        match self.value(desc.number()) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::default_value_for_field(desc)),
        }
    }

    pub(super) fn get_mut(&mut self, desc: &FieldDescriptor) -> &mut Value {
        match self.values.entry(desc.number()) {
            btree_map::Entry::Occupied(entry) => entry.into_mut(),
            btree_map::Entry::Vacant(entry) => entry.insert(Value::default_value_for_field(desc)),
        }
    }

    pub(super) fn set(&mut self, desc: &FieldDescriptor, value: Value) {
        debug_assert!(
            value.is_valid_for_field(desc),
            "invalid value {:?} for field {:?}",
            value,
            desc,
        );
        self.values.insert(desc.number(), value);
    }

    pub(super) fn clear(&mut self, desc: &FieldDescriptor) {
        self.values.remove(&desc.number());
    }

    pub(super) fn take(&mut self, desc: &FieldDescriptor) -> Option<Value> {
        self.values.remove(&desc.number())
    }

    pub(super) fn add_unknown(&mut self, number: u32, field: UnknownField) {
        self.unknown.insert(number, field);
    }

    pub(super) fn unknown(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    pub(super) fn clear_all(&mut self) {
        self.values.clear();
        self.unknown.clear_fields();
    }
}
