//! Update dispatch contracts.
//!
//! The host loop decides when each contract fires; the core never orders
//! updaters relative to each other. The `input` value is passed through
//! unmodified.
//!
//! Every map handed to an updater is a detached copy taken when dispatch
//! starts. Writing through the [`Manager`] from inside `for_each` is safe, and
//! those writes show up in the indexes, not in the copy being traversed.

use crate::ecs::{Entity, EntityComponentMap, Manager, SystemComponentMap, SystemController, SystemMap};

/// Receives a copy of the whole primary index, for coordination across systems.
pub trait SystemsUpdater<I>: SystemController {
    fn update_systems(&mut self, systems: &SystemMap, manager: &dyn Manager, input: &I);
}

/// Receives the row of the updater's own system: its components across all entities.
pub trait SystemEntitiesUpdater<I>: SystemController {
    fn update_entities(&mut self, entities: &EntityComponentMap, manager: &dyn Manager, input: &I);
}

/// Receives one entity's components across every system.
pub trait ComponentUpdater<I>: SystemController {
    fn update_components(
        &mut self,
        components: &SystemComponentMap,
        entity: &Entity,
        manager: &dyn Manager,
        input: &I,
    );
}
