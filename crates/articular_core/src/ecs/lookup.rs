// lookup.rs - entity lookup strategies
//
// The composite World answers "which components does this entity have" either
// from the cache index or by scanning the primary index. Both strategies sit
// behind one trait so the World can swap them at runtime.

use crate::ecs::{
    CacheIndex, ComponentRef, Entity, EntityId, PrimaryIndex, SystemComponentMap, SystemId,
    WorldResult,
};
use std::fmt;
use tracing::{debug, trace};

pub(crate) trait EntityLookup: fmt::Debug + Send + Sync {
    fn is_caching(&self) -> bool;

    fn cache(&self) -> Option<&CacheIndex>;

    /// Reserve the per-entity row; a row that already exists is kept.
    fn allocate_row(&self, entity: &Entity);

    fn mirror(&self, entity: EntityId, system: SystemId, component: ComponentRef);

    fn forget(&self, entity: EntityId, system: SystemId);

    fn forget_entity(&self, entity: EntityId);

    fn forget_system(&self, system: SystemId);

    /// One entity's components across every system, as a detached copy.
    fn components_of(&self, primary: &PrimaryIndex, entity: &Entity) -> WorldResult<SystemComponentMap>;
}

impl EntityLookup for CacheIndex {
    fn is_caching(&self) -> bool {
        true
    }

    fn cache(&self) -> Option<&CacheIndex> {
        Some(self)
    }

    fn allocate_row(&self, entity: &Entity) {
        if self.allocate_memory_map(entity).is_ok() {
            trace!(%entity, "cache row allocated");
        }
    }

    fn mirror(&self, entity: EntityId, system: SystemId, component: ComponentRef) {
        self.register(entity, system, component);
    }

    fn forget(&self, entity: EntityId, system: SystemId) {
        self.unregister(entity, system);
    }

    fn forget_entity(&self, entity: EntityId) {
        self.unregister_entity(entity);
    }

    fn forget_system(&self, system: SystemId) {
        CacheIndex::forget_system(self, system);
    }

    fn components_of(&self, primary: &PrimaryIndex, entity: &Entity) -> WorldResult<SystemComponentMap> {
        primary.ensure_entity(entity)?;
        match self.memory_map_of(entity) {
            Some(row) => Ok(SystemComponentMap::clone(&row)),
            None => {
                debug!(%entity, "no cache row, falling back to scan");
                primary.entity_components(entity)
            }
        }
    }
}

/// Scan the primary index on every lookup; keeps no derived state.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LinearScan;

impl EntityLookup for LinearScan {
    fn is_caching(&self) -> bool {
        false
    }

    fn cache(&self) -> Option<&CacheIndex> {
        None
    }

    fn allocate_row(&self, _entity: &Entity) {}

    fn mirror(&self, _entity: EntityId, _system: SystemId, _component: ComponentRef) {}

    fn forget(&self, _entity: EntityId, _system: SystemId) {}

    fn forget_entity(&self, _entity: EntityId) {}

    fn forget_system(&self, _system: SystemId) {}

    fn components_of(&self, primary: &PrimaryIndex, entity: &Entity) -> WorldResult<SystemComponentMap> {
        primary.entity_components(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{AssociatedSystem, SystemController, WorldError};
    use std::sync::Arc;

    const INPUT: AssociatedSystem = AssociatedSystem::new("INPUT");
    const OUTPUT: AssociatedSystem = AssociatedSystem::new("OUTPUT");

    fn primary() -> (PrimaryIndex, Entity) {
        let primary = PrimaryIndex::new();
        primary.allocate_memory_map(&INPUT).unwrap();
        primary.allocate_memory_map(&OUTPUT).unwrap();
        let mouse = primary.create_entity(&[&INPUT, &OUTPUT], "Mouse").unwrap();
        (primary, mouse)
    }

    #[test]
    fn strategies_agree_on_a_rebuilt_cache() {
        let (primary, mouse) = primary();
        let cache = CacheIndex::rebuild_from(&primary);

        let cached = cache.components_of(&primary, &mouse).unwrap();
        let scanned = LinearScan.components_of(&primary, &mouse).unwrap();
        assert_eq!(cached.keys().len(), 2);
        for (system, component) in scanned.snapshot() {
            assert!(Arc::ptr_eq(&cached.get(&system).unwrap(), &component));
        }
    }

    #[test]
    fn cached_view_is_detached_from_the_row() {
        let (primary, mouse) = primary();
        let cache = CacheIndex::rebuild_from(&primary);
        let view = cache.components_of(&primary, &mouse).unwrap();

        cache.unregister(mouse.id(), INPUT.id());
        assert_eq!(view.len(), 2);
        view.remove(&OUTPUT.id());
        assert_eq!(cache.memory_map_of(&mouse).unwrap().keys(), vec![OUTPUT.id()]);
    }

    #[test]
    fn colliding_entity_is_rejected_by_both() {
        let (primary, _) = primary();
        primary.create_entity(&[&INPUT], "n512789").unwrap();
        let cache = CacheIndex::rebuild_from(&primary);
        let intruder = Entity::new("n749192");
        assert!(matches!(
            cache.components_of(&primary, &intruder),
            Err(WorldError::IdCollision { .. })
        ));
        assert!(matches!(
            LinearScan.components_of(&primary, &intruder),
            Err(WorldError::IdCollision { .. })
        ));
    }

    #[test]
    fn missing_row_falls_back_to_scan() {
        let (primary, mouse) = primary();
        let cache = CacheIndex::new();
        let view = cache.components_of(&primary, &mouse).unwrap();
        assert!(view.contains_key(&INPUT.system_id()));
        assert!(cache.is_empty());
    }

    #[test]
    fn unknown_entity_is_rejected_by_both() {
        let (primary, _) = primary();
        let ghost = Entity::new("Ghost");
        let expected = WorldError::UnknownEntity { entity: ghost.id() };
        assert_eq!(LinearScan.components_of(&primary, &ghost).unwrap_err(), expected);
        assert_eq!(
            CacheIndex::new().components_of(&primary, &ghost).unwrap_err(),
            expected
        );
    }
}
