use crate::schema::ModelClass;
use serde_json::Value;
use std::collections::HashMap;

/// Per-instance attribute storage, keyed by slot name.
pub type Slots = HashMap<String, Value>;

/// A row of a model. Attribute access goes through the model's accessor
/// table when one is installed for the name, and straight to the slots
/// otherwise.
#[derive(Debug, Clone)]
pub struct ModelInstance<'m> {
    model: &'m ModelClass,
    slots: Slots,
}

impl<'m> ModelInstance<'m> {
    pub fn new(model: &'m ModelClass) -> Self {
        Self {
            model,
            slots: Slots::new(),
        }
    }

    pub fn model(&self) -> &'m ModelClass {
        self.model
    }

    pub fn get(&self, attr: &str) -> Option<Value> {
        match self.model.accessor(attr) {
            Some(accessor) => accessor.get(&self.slots),
            None => self.slots.get(attr).cloned(),
        }
    }

    pub fn set(&mut self, attr: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.model.accessor(attr) {
            Some(accessor) => accessor.set(&mut self.slots, value),
            None => {
                self.slots.insert(attr.to_string(), value);
            }
        }
    }

    /// Stored value of a slot, bypassing accessors.
    pub fn raw(&self, slot: &str) -> Option<&Value> {
        self.slots.get(slot)
    }

    /// Store a value directly, e.g. when loading a row from storage.
    pub fn set_raw(&mut self, slot: impl Into<String>, value: impl Into<Value>) {
        self.slots.insert(slot.into(), value.into());
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }
}
