//! Modules: components that aggregate sub-components.
//!
//! A module groups homogeneous components (all buttons of a mouse, all
//! sensors of a board) under a single identifier so the group can be
//! registered against one (entity, system) slot. Sub-components are keyed by
//! their own id or by the id of an entity acting as an identifier provider.

use crate::ecs::{Component, ComponentId, ComponentMap, ComponentRef, Entity, FieldValue};
use std::any::Any;

/// Component owning a [`ComponentMap`] of sub-components.
#[derive(Debug)]
pub struct Module {
    id: ComponentId,
    components: ComponentMap,
}

impl Module {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            components: ComponentMap::new(),
        }
    }

    /// Module keyed by the entity that owns it.
    pub fn for_entity(entity: &Entity) -> Self {
        Self::new(entity.id().into())
    }

    /// Register `component` under its own id, replacing any previous entry.
    pub fn register(&self, component: ComponentRef) -> Option<ComponentRef> {
        self.register_as(component.id(), component)
    }

    /// Register `component` under an external identifier.
    pub fn register_as(&self, id: ComponentId, component: ComponentRef) -> Option<ComponentRef> {
        self.components.insert(id, component)
    }

    /// Register `component` using `entity` as the identifier provider.
    pub fn register_entity(&self, entity: &Entity, component: ComponentRef) -> Option<ComponentRef> {
        self.register_as(entity.id().into(), component)
    }

    pub fn unregister(&self, id: ComponentId) -> Option<ComponentRef> {
        self.components.remove(&id)
    }

    pub fn get(&self, id: ComponentId) -> Option<ComponentRef> {
        self.components.get(&id)
    }

    pub fn get_entity(&self, entity: &Entity) -> Option<ComponentRef> {
        self.get(entity.id().into())
    }

    pub fn has(&self, id: ComponentId) -> bool {
        self.components.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &ComponentMap {
        &self.components
    }
}

impl Component for Module {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            "len" => Some(FieldValue::from(self.components.len())),
            _ => None,
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["id", "len"]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_module(&self) -> Option<&Module> {
        Some(self)
    }
}
