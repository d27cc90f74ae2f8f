//! Name-only entity handle
//!
//! An entity carries no data of its own. Its identifier is a pure function of
//! its name, so two handles built from the same name are interchangeable.

use crate::ecs::EntityId;
use std::fmt;
use std::sync::Arc;

/// Identity-only handle grouping components across systems.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entity {
    id: EntityId,
    name: Arc<str>,
}

impl Entity {
    /// Build a handle for `name`. This does not register anything; use
    /// [`World::create_entity`](crate::ecs::World::create_entity) for that.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        let name = name.into();
        Self {
            id: EntityId::from_name(&name),
            name,
        }
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}
