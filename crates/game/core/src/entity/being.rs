use std::collections::BTreeSet;

use super::{Component, ComponentKind};
use crate::attribute::{AttributeId, AttributeStore, Modifier, ModifierSource};
use crate::character::lifecycle::Lifecycle;

/// A living thing: display name, lifecycle and attribute values.
///
/// Attribute mutations are recorded as pending change notifications which the
/// owner drains with [`take_changed`](Self::take_changed).
#[derive(Clone, Debug)]
pub struct BeingComponent {
    name: String,
    lifecycle: Lifecycle,
    attributes: AttributeStore,
    changed: BTreeSet<AttributeId>,
}

impl BeingComponent {
    pub fn new(name: impl Into<String>, attributes: AttributeStore) -> Self {
        Self {
            name: name.into(),
            lifecycle: Lifecycle::default(),
            attributes,
            changed: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    pub fn is_dead(&self) -> bool {
        self.lifecycle.is_dead()
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn attribute_base(&self, id: AttributeId) -> Option<f64> {
        self.attributes.base(id)
    }

    pub fn modified_attribute(&self, id: AttributeId) -> Option<f64> {
        self.attributes.modified(id)
    }

    /// Sets a base value; the attribute and its dependents are recalculated
    /// and reported as changed. Returns `false` for attributes this being
    /// does not carry.
    pub fn set_attribute(&mut self, id: AttributeId, value: f64) -> bool {
        let touched = self.attributes.set_base(id, value);
        let applied = !touched.is_empty();
        self.changed.extend(touched);
        applied
    }

    pub fn recalculate(&mut self, id: AttributeId) {
        if self.attributes.recalculate(id) {
            self.changed.insert(id);
        }
    }

    pub fn add_modifier(&mut self, id: AttributeId, source: ModifierSource, modifier: Modifier) {
        let touched = self.attributes.add_modifier(id, source, modifier);
        self.changed.extend(touched);
    }

    pub fn remove_modifier(&mut self, id: AttributeId, source: ModifierSource) {
        let touched = self.attributes.remove_modifier(id, source);
        self.changed.extend(touched);
    }

    /// Drains pending change notifications.
    pub fn take_changed(&mut self) -> BTreeSet<AttributeId> {
        std::mem::take(&mut self.changed)
    }
}

impl Component for BeingComponent {
    const KIND: ComponentKind = ComponentKind::Being;
}
