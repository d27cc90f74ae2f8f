// world.rs - composite World over the primary and cache indexes
//
// Every mutation goes to the primary index first and is then mirrored through
// the active lookup strategy. Reads of a single slot always come from the
// primary index; per-entity views come from the lookup.

use crate::config::WorldConfig;
use crate::ecs::lookup::{EntityLookup, LinearScan};
use crate::ecs::{
    CacheIndex, ComponentId, ComponentRef, ComponentUpdater, DataPipe, DataPipeRegistry, Entity,
    EntityComponentMap, Manager, Placeholder, PrimaryIndex, SystemComponentMap, SystemController,
    SystemEntitiesUpdater, SystemId, SystemMap, SystemsUpdater, WorldError, WorldResult,
};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, trace};

/// Dual-indexed component store.
///
/// `World` is `Send + Sync`; share it by reference across threads. Only
/// [`set_caching`](Self::set_caching) needs exclusive access.
#[derive(Debug)]
pub struct World {
    primary: PrimaryIndex,
    lookup: Box<dyn EntityLookup>,
    config: WorldConfig,
    write_lock: Mutex<()>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        debug!(caching = config.caching, serialize_writes = config.serialize_writes, "world created");
        Self {
            primary: PrimaryIndex::new(),
            lookup: lookup_for(config.caching, None),
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn is_caching(&self) -> bool {
        self.lookup.is_caching()
    }

    /// Switch the lookup strategy.
    ///
    /// Enabling rebuilds the cache from the primary index, so the result is
    /// identical to a cache that had been mirroring every write. Disabling
    /// drops the cache.
    pub fn set_caching(&mut self, enabled: bool) {
        if enabled == self.is_caching() {
            return;
        }
        self.lookup = lookup_for(enabled, Some(&self.primary));
        self.config.caching = enabled;
        debug!(enabled, "caching toggled");
    }

    /// The cache index, when caching is enabled.
    pub fn cache(&self) -> Option<&CacheIndex> {
        self.lookup.cache()
    }

    /// Component at (entity, system), read from the cache index.
    ///
    /// Entity and system names are checked against the primary index first,
    /// since the cache alone cannot tell colliding names apart.
    pub fn cached_component<S>(&self, entity: &Entity, system: &S) -> WorldResult<ComponentRef>
    where
        S: SystemController + ?Sized,
    {
        let cache = self.cache().ok_or(WorldError::CachingDisabled)?;
        self.primary.ensure_entity(entity)?;
        self.primary.ensure_system(system)?;
        cache.get_component(entity, system)
    }

    pub fn allocate_memory_map<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        let _guard = self.write_guard();
        self.primary.allocate_memory_map(system)
    }

    /// Install a prebuilt row for `system`; the cache is brought in line with it.
    pub fn register_memory_map<S>(
        &self,
        system: &S,
        row: EntityComponentMap,
    ) -> WorldResult<Option<Arc<EntityComponentMap>>>
    where
        S: SystemController + ?Sized,
    {
        let _guard = self.write_guard();
        let entries = row.snapshot();
        let previous = self.primary.register_memory_map(system, row)?;
        let id = system.system_id();
        self.lookup.forget_system(id);
        for (entity, component) in entries {
            self.lookup.mirror(entity, id, component);
        }
        Ok(previous)
    }

    pub fn release_memory_map<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        let _guard = self.write_guard();
        let row = self.primary.release_memory_map(system)?;
        self.lookup.forget_system(system.system_id());
        Ok(row)
    }

    /// Create `name` with a placeholder in each of `systems`.
    pub fn create_entity(&self, systems: &[&dyn SystemController], name: &str) -> WorldResult<Entity> {
        let _guard = self.write_guard();
        let entity = self.primary.create_entity(systems, name)?;
        self.lookup.allocate_row(&entity);
        for system in systems {
            if let Ok(component) = self.primary.get_component(&entity, *system) {
                self.lookup.mirror(entity.id(), system.system_id(), component);
            }
        }
        Ok(entity)
    }

    pub fn destroy_entity(&self, entity: &Entity) -> WorldResult<Vec<SystemId>> {
        let _guard = self.write_guard();
        let detached = self.primary.destroy_entity(entity)?;
        self.lookup.forget_entity(entity.id());
        Ok(detached)
    }

    /// Insert or replace the component at (entity, system) in both indexes.
    pub fn register<S>(
        &self,
        entity: &Entity,
        component: ComponentRef,
        system: &S,
    ) -> WorldResult<Option<ComponentRef>>
    where
        S: SystemController + ?Sized,
    {
        let _guard = self.write_guard();
        let previous = self.primary.register(entity, component.clone(), system)?;
        self.lookup.mirror(entity.id(), system.system_id(), component);
        Ok(previous)
    }

    pub fn unregister<S>(&self, entity: &Entity, system: &S) -> WorldResult<Option<ComponentRef>>
    where
        S: SystemController + ?Sized,
    {
        let _guard = self.write_guard();
        let previous = self.primary.unregister(entity, system)?;
        self.lookup.forget(entity.id(), system.system_id());
        Ok(previous)
    }

    /// Register a placeholder carrying `id` at (entity, system).
    pub fn allocate_component<S>(
        &self,
        entity: &Entity,
        system: &S,
        id: ComponentId,
    ) -> WorldResult<ComponentRef>
    where
        S: SystemController + ?Sized,
    {
        let component: ComponentRef = Arc::new(Placeholder::new(id));
        self.register(entity, component.clone(), system)?;
        Ok(component)
    }

    pub fn get_component<S>(&self, entity: &Entity, system: &S) -> WorldResult<ComponentRef>
    where
        S: SystemController + ?Sized,
    {
        self.primary.get_component(entity, system)
    }

    pub fn has_component<S>(&self, entity: &Entity, system: &S) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.primary.has_component(entity, system)
    }

    pub fn has_same_component<S>(&self, entity: &Entity, system: &S, component: &ComponentRef) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.primary.has_same_component(entity, system, component)
    }

    pub fn has_memory_map<S>(&self, system: &S) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.primary.has_memory_map(system)
    }

    /// Copy of one entity's components across every system, via the active lookup.
    pub fn entity_components(&self, entity: &Entity) -> WorldResult<SystemComponentMap> {
        self.lookup.components_of(&self.primary, entity)
    }

    /// The primary index, read-only. Writes go through the `World` methods.
    pub fn memory_map(&self) -> &SystemMap {
        self.primary.memory_map()
    }

    pub fn memory_map_of<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        self.primary.memory_map_of(system)
    }

    pub fn is_entity(&self, entity: &Entity) -> bool {
        self.primary.is_entity(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.primary.entity_count()
    }

    pub fn system_count(&self) -> usize {
        self.primary.system_count()
    }

    pub fn data_pipes(&self) -> &DataPipeRegistry {
        self.primary.data_pipes()
    }

    pub fn register_data_pipe<A: 'static, T: 'static>(&self, pipe: DataPipe<A, T>) {
        self.data_pipes().register(pipe);
    }

    pub fn register_data_pipe_as<A: 'static, T: 'static>(&self, id: ComponentId, pipe: DataPipe<A, T>) {
        self.data_pipes().register_as(id, pipe);
    }

    pub fn unregister_data_pipe(&self, id: ComponentId) -> bool {
        self.data_pipes().unregister(id)
    }

    pub fn get_data_pipe<A: 'static, T: 'static>(&self, id: ComponentId) -> WorldResult<DataPipe<A, T>> {
        self.data_pipes().get(id)
    }

    pub fn has_data_pipe(&self, id: ComponentId) -> bool {
        self.data_pipes().contains(id)
    }

    pub fn apply_data_pipe<A: 'static, T: 'static>(&self, id: ComponentId, argument: A) -> WorldResult<T> {
        self.data_pipes().apply(id, argument)
    }

    /// Hand a copy of the whole primary index to `updater`.
    pub fn update_systems<I, U>(&self, updater: &mut U, input: &I)
    where
        U: SystemsUpdater<I> + ?Sized,
    {
        trace!(updater = updater.associated_system(), "update systems");
        updater.update_systems(&self.primary.detached_systems(), self, input);
    }

    /// Hand a copy of the updater's own system row to `updater`.
    pub fn update_system_components<I, U>(&self, updater: &mut U, input: &I) -> WorldResult<()>
    where
        U: SystemEntitiesUpdater<I> + ?Sized,
    {
        let row = EntityComponentMap::clone(&*self.primary.memory_map_of(&*updater)?);
        trace!(updater = updater.associated_system(), entities = row.len(), "update system components");
        updater.update_entities(&row, self, input);
        Ok(())
    }

    /// Hand `entity`'s components across every system to `updater`.
    pub fn update_entity_components<I, U>(
        &self,
        updater: &mut U,
        entity: &Entity,
        input: &I,
    ) -> WorldResult<()>
    where
        U: ComponentUpdater<I> + ?Sized,
    {
        let components = self.entity_components(entity)?;
        trace!(
            updater = updater.associated_system(),
            %entity,
            cached = self.is_caching(),
            "update entity components"
        );
        updater.update_components(&components, entity, self, input);
        Ok(())
    }

    fn write_guard(&self) -> Option<MutexGuard<'_, ()>> {
        self.config.serialize_writes.then(|| self.write_lock.lock())
    }
}

fn lookup_for(caching: bool, primary: Option<&PrimaryIndex>) -> Box<dyn EntityLookup> {
    match (caching, primary) {
        (true, Some(primary)) => Box::new(CacheIndex::rebuild_from(primary)),
        (true, None) => Box::new(CacheIndex::new()),
        (false, _) => Box::new(LinearScan),
    }
}

impl Manager for World {
    fn component(&self, entity: &Entity, system: &dyn SystemController) -> WorldResult<ComponentRef> {
        self.get_component(entity, system)
    }

    fn components_of(&self, entity: &Entity) -> WorldResult<SystemComponentMap> {
        self.entity_components(entity)
    }

    fn register(
        &self,
        entity: &Entity,
        component: ComponentRef,
        system: &dyn SystemController,
    ) -> WorldResult<Option<ComponentRef>> {
        World::register(self, entity, component, system)
    }

    fn unregister(
        &self,
        entity: &Entity,
        system: &dyn SystemController,
    ) -> WorldResult<Option<ComponentRef>> {
        World::unregister(self, entity, system)
    }

    fn data_pipes(&self) -> &DataPipeRegistry {
        self.primary.data_pipes()
    }
}
