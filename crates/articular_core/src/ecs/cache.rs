// cache.rs - Entity -> System -> Component index
//
// Derived from the primary index. Only the composite World writes to it, so
// every mutator here is crate-private. The cache keys on hashed ids alone and
// cannot tell colliding names apart; name-aware reads go through the World.

use crate::ecs::{
    CacheMap, ComponentRef, Entity, EntityId, PrimaryIndex, SystemComponentMap, SystemController,
    SystemId, WorldError, WorldResult,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Entity-first mirror of the primary index.
#[derive(Debug, Default)]
pub struct CacheIndex {
    rows: CacheMap,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache equal to one that mirrored every write to `primary`.
    pub fn rebuild_from(primary: &PrimaryIndex) -> Self {
        let cache = Self::new();
        for entity in primary.entity_ids() {
            cache.ensure_row(entity);
        }
        primary.memory_map().for_each(|system, row| {
            row.for_each(|entity, component| {
                cache.register(*entity, *system, component.clone());
            });
        });
        debug!(rows = cache.rows.len(), "cache rebuilt from primary index");
        cache
    }

    /// Component at (entity, system). Both the row and the entry must exist.
    pub(crate) fn get_component<S>(&self, entity: &Entity, system: &S) -> WorldResult<ComponentRef>
    where
        S: SystemController + ?Sized,
    {
        let system = system.system_id();
        self.rows
            .get(&entity.id())
            .ok_or(WorldError::CacheRowNotFound { entity: entity.id() })?
            .get(&system)
            .ok_or(WorldError::ComponentNotFound {
                entity: entity.id(),
                system,
            })
    }

    /// The row of `entity`, if it has been allocated.
    pub(crate) fn memory_map_of(&self, entity: &Entity) -> Option<Arc<SystemComponentMap>> {
        self.rows.get(&entity.id())
    }

    /// The whole cache index, read-only and keyed by raw id.
    pub fn memory_map(&self) -> &CacheMap {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Create the empty row for `entity`, rejecting duplicates.
    pub(crate) fn allocate_memory_map(&self, entity: &Entity) -> WorldResult<Arc<SystemComponentMap>> {
        self.rows
            .insert_if_absent(entity.id(), Arc::new(SystemComponentMap::new()))
            .map_err(|_| WorldError::DuplicateRegistration {
                key: entity.to_string(),
            })
    }

    pub(crate) fn ensure_row(&self, entity: EntityId) -> Arc<SystemComponentMap> {
        self.rows
            .get_or_insert_with(entity, || Arc::new(SystemComponentMap::new()))
    }

    /// Mirror one component, creating the entity's row on first use.
    pub(crate) fn register(
        &self,
        entity: EntityId,
        system: SystemId,
        component: ComponentRef,
    ) -> Option<ComponentRef> {
        trace!(%entity, %system, "cache register");
        self.ensure_row(entity).insert(system, component)
    }

    /// Drop one mapping. A missing row means nothing was cached.
    pub(crate) fn unregister(&self, entity: EntityId, system: SystemId) -> Option<ComponentRef> {
        trace!(%entity, %system, "cache unregister");
        self.rows.get(&entity)?.remove(&system)
    }

    /// Drop the whole row of `entity`.
    pub(crate) fn unregister_entity(&self, entity: EntityId) -> Option<Arc<SystemComponentMap>> {
        self.rows.remove(&entity)
    }

    /// Remove `system` from every row.
    pub(crate) fn forget_system(&self, system: SystemId) {
        self.rows.for_each(|_, row| {
            row.remove(&system);
        });
    }
}
