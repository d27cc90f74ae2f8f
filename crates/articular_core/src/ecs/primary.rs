// primary.rs - System -> Entity -> Component index
//
// The primary index is the system of record. It owns the system rows, the
// name registries used to reject identifier collisions, and the data pipes.

use crate::ecs::{
    ComponentId, ComponentRef, ComponentUpdater, DataPipeRegistry, Entity, EntityComponentMap,
    EntityId, Manager, MemoryMap, Placeholder, SystemComponentMap, SystemController,
    SystemEntitiesUpdater, SystemId, SystemMap, SystemsUpdater, WorldError, WorldResult,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// System-first index: every system row maps entity ids to components.
#[derive(Debug, Default)]
pub struct PrimaryIndex {
    systems: SystemMap,
    system_names: MemoryMap<SystemId, Arc<str>>,
    entity_names: MemoryMap<EntityId, Arc<str>>,
    data_pipes: DataPipeRegistry,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the empty row for `system`.
    ///
    /// Fails with [`WorldError::DuplicateRegistration`] if the row already
    /// exists and with [`WorldError::IdCollision`] if another system name
    /// hashes to the same id.
    pub fn allocate_memory_map<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        let id = self.claim_system(system)?;
        let row = self
            .systems
            .insert_if_absent(id, Arc::new(EntityComponentMap::new()))
            .map_err(|_| WorldError::DuplicateRegistration {
                key: system.associated_system().to_string(),
            })?;
        debug!(system = system.associated_system(), %id, "system row allocated");
        Ok(row)
    }

    /// Install a prebuilt row for `system`, replacing any existing one.
    ///
    /// Every key of `row` must be a created entity; nothing is written otherwise.
    /// The index takes ownership of `row`, so the caller keeps no handle to it.
    pub fn register_memory_map<S>(
        &self,
        system: &S,
        row: EntityComponentMap,
    ) -> WorldResult<Option<Arc<EntityComponentMap>>>
    where
        S: SystemController + ?Sized,
    {
        if let Some(entity) = row.keys().into_iter().find(|e| !self.entity_names.contains_key(e)) {
            return Err(WorldError::UnknownEntity { entity });
        }
        let id = self.claim_system(system)?;
        debug!(system = system.associated_system(), entries = row.len(), "system row installed");
        Ok(self.systems.insert(id, Arc::new(row)))
    }

    /// Drop the row for `system` together with every component in it.
    ///
    /// The system's name is released as well, so the id can be claimed again.
    pub fn release_memory_map<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        let id = self.ensure_system(system)?;
        let row = self
            .systems
            .remove(&id)
            .ok_or(WorldError::UnknownSystem { system: id })?;
        self.system_names.remove(&id);
        debug!(system = system.associated_system(), "system row released");
        Ok(row)
    }

    /// Create the entity `name` and attach a placeholder to each of `systems`.
    ///
    /// All systems are checked before anything is written. Creating an entity
    /// that already exists is idempotent: occupied slots keep their component.
    pub fn create_entity(&self, systems: &[&dyn SystemController], name: &str) -> WorldResult<Entity> {
        let rows = systems
            .iter()
            .map(|system| self.resolve_system(*system))
            .collect::<WorldResult<Vec<_>>>()?;

        let entity = Entity::new(name);
        self.claim_entity(&entity)?;

        let placeholder_id = ComponentId::from(entity.id());
        for row in rows {
            row.get_or_insert_with(entity.id(), || Arc::new(Placeholder::new(placeholder_id)));
        }
        debug!(%entity, systems = systems.len(), "entity created");
        Ok(entity)
    }

    /// Remove `entity` from every row and forget its name.
    ///
    /// Returns the systems it was removed from.
    pub fn destroy_entity(&self, entity: &Entity) -> WorldResult<Vec<SystemId>> {
        self.ensure_entity(entity)?;
        let mut detached = Vec::new();
        self.systems.for_each(|system, row| {
            if row.remove(&entity.id()).is_some() {
                detached.push(*system);
            }
        });
        self.entity_names.remove(&entity.id());
        debug!(%entity, detached = detached.len(), "entity destroyed");
        Ok(detached)
    }

    /// Register a [`Placeholder`] carrying `id` at (entity, system).
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

    /// Insert or replace the component at (entity, system).
    pub fn register<S>(
        &self,
        entity: &Entity,
        component: ComponentRef,
        system: &S,
    ) -> WorldResult<Option<ComponentRef>>
    where
        S: SystemController + ?Sized,
    {
        let row = self.resolve_system(system)?;
        self.ensure_entity(entity)?;
        trace!(%entity, system = system.associated_system(), component = %component.id(), "register");
        Ok(row.insert(entity.id(), component))
    }

    /// Remove the component at (entity, system); a missing entry is a no-op.
    pub fn unregister<S>(&self, entity: &Entity, system: &S) -> WorldResult<Option<ComponentRef>>
    where
        S: SystemController + ?Sized,
    {
        let row = self.resolve_system(system)?;
        self.ensure_entity(entity)?;
        trace!(%entity, system = system.associated_system(), "unregister");
        Ok(row.remove(&entity.id()))
    }

    pub fn get_component<S>(&self, entity: &Entity, system: &S) -> WorldResult<ComponentRef>
    where
        S: SystemController + ?Sized,
    {
        let row = self.resolve_system(system)?;
        self.ensure_entity(entity)?;
        row.get(&entity.id()).ok_or(WorldError::ComponentNotFound {
            entity: entity.id(),
            system: system.system_id(),
        })
    }

    pub fn has_component<S>(&self, entity: &Entity, system: &S) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.get_component(entity, system).is_ok()
    }

    /// Whether (entity, system) holds exactly this component instance.
    pub fn has_same_component<S>(&self, entity: &Entity, system: &S, component: &ComponentRef) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.get_component(entity, system)
            .is_ok_and(|stored| Arc::ptr_eq(&stored, component))
    }

    pub fn has_memory_map<S>(&self, system: &S) -> bool
    where
        S: SystemController + ?Sized,
    {
        self.resolve_system(system).is_ok()
    }

    /// Synthesize the system -> component view of one entity.
    ///
    /// Scans every system row, so the cost is linear in the number of systems.
    pub fn entity_components(&self, entity: &Entity) -> WorldResult<SystemComponentMap> {
        self.ensure_entity(entity)?;
        let view = SystemComponentMap::new();
        self.systems.for_each(|system, row| {
            if let Some(component) = row.get(&entity.id()) {
                view.insert(*system, component);
            }
        });
        Ok(view)
    }

    /// The whole primary index, read-only.
    pub fn memory_map(&self) -> &SystemMap {
        &self.systems
    }

    /// Read-only row of `system`.
    pub fn memory_map_of<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        self.resolve_system(system)
    }

    pub fn is_entity(&self, entity: &Entity) -> bool {
        self.ensure_entity(entity).is_ok()
    }

    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entity_names.keys()
    }

    pub fn entity_count(&self) -> usize {
        self.entity_names.len()
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    pub fn data_pipes(&self) -> &DataPipeRegistry {
        &self.data_pipes
    }

    /// Hand the whole system map to `updater`.
    pub fn update_systems<I, U>(&self, updater: &mut U, input: &I)
    where
        U: SystemsUpdater<I> + ?Sized,
    {
        trace!(updater = updater.associated_system(), "update systems");
        updater.update_systems(&self.detached_systems(), self, input);
    }

    /// Hand the row of the updater's own system to `updater`.
    pub fn update_system_components<I, U>(&self, updater: &mut U, input: &I) -> WorldResult<()>
    where
        U: SystemEntitiesUpdater<I> + ?Sized,
    {
        let row = EntityComponentMap::clone(&*self.resolve_system(&*updater)?);
        trace!(updater = updater.associated_system(), entities = row.len(), "update system components");
        updater.update_entities(&row, self, input);
        Ok(())
    }

    /// Hand a synthesized view of `entity`'s components to `updater`.
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
        trace!(updater = updater.associated_system(), %entity, "update entity components (scan)");
        updater.update_components(&components, entity, self, input);
        Ok(())
    }

    /// Copy of every row, detached from the index.
    pub(crate) fn detached_systems(&self) -> SystemMap {
        self.systems
            .snapshot()
            .into_iter()
            .map(|(id, row)| (id, Arc::new(EntityComponentMap::clone(&row))))
            .collect()
    }

    /// The row of `system`, provided its id was claimed under the same name.
    fn resolve_system<S>(&self, system: &S) -> WorldResult<Arc<EntityComponentMap>>
    where
        S: SystemController + ?Sized,
    {
        let id = self.ensure_system(system)?;
        self.systems.get(&id).ok_or(WorldError::UnknownSystem { system: id })
    }

    pub(crate) fn ensure_system<S>(&self, system: &S) -> WorldResult<SystemId>
    where
        S: SystemController + ?Sized,
    {
        let id = system.system_id();
        match self.system_names.get(&id) {
            Some(name) if &*name == system.associated_system() => Ok(id),
            Some(name) => Err(collision(id.raw(), &name, system.associated_system())),
            None => Err(WorldError::UnknownSystem { system: id }),
        }
    }

    pub(crate) fn ensure_entity(&self, entity: &Entity) -> WorldResult<()> {
        match self.entity_names.get(&entity.id()) {
            Some(name) if &*name == entity.name() => Ok(()),
            Some(name) => Err(collision(entity.id().raw(), &name, entity.name())),
            None => Err(WorldError::UnknownEntity { entity: entity.id() }),
        }
    }

    fn claim_system<S>(&self, system: &S) -> WorldResult<SystemId>
    where
        S: SystemController + ?Sized,
    {
        let id = system.system_id();
        claim(&self.system_names, id, id.raw(), system.associated_system())?;
        Ok(id)
    }

    fn claim_entity(&self, entity: &Entity) -> WorldResult<()> {
        claim(&self.entity_names, entity.id(), entity.id().raw(), entity.name())
    }
}

fn claim<K>(names: &MemoryMap<K, Arc<str>>, key: K, raw: u32, name: &str) -> WorldResult<()>
where
    K: Eq + std::hash::Hash + Copy,
{
    match names.insert_if_absent(key, Arc::from(name)) {
        Ok(_) => Ok(()),
        Err(existing) if &*existing == name => Ok(()),
        Err(existing) => {
            warn!(id = raw, existing = &*existing, requested = name, "identifier collision rejected");
            Err(collision(raw, &existing, name))
        }
    }
}

fn collision(id: u32, existing: &str, requested: &str) -> WorldError {
    WorldError::IdCollision {
        id,
        existing: existing.to_string(),
        requested: requested.to_string(),
    }
}

impl Manager for PrimaryIndex {
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
        PrimaryIndex::register(self, entity, component, system)
    }

    fn unregister(
        &self,
        entity: &Entity,
        system: &dyn SystemController,
    ) -> WorldResult<Option<ComponentRef>> {
        PrimaryIndex::unregister(self, entity, system)
    }

    fn data_pipes(&self) -> &DataPipeRegistry {
        &self.data_pipes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{AssociatedSystem, Module};

    const INPUT: AssociatedSystem = AssociatedSystem::new("INPUT");
    const PHYSICS: AssociatedSystem = AssociatedSystem::new("PHYSICS");

    fn index() -> PrimaryIndex {
        let index = PrimaryIndex::new();
        index.allocate_memory_map(&INPUT).unwrap();
        index.allocate_memory_map(&PHYSICS).unwrap();
        index
    }

    #[test]
    fn duplicate_allocation_is_rejected() {
        let index = index();
        assert_eq!(
            index.allocate_memory_map(&INPUT).unwrap_err(),
            WorldError::DuplicateRegistration { key: "INPUT".into() }
        );
        assert_eq!(index.system_count(), 2);
    }

    #[test]
    fn create_entity_attaches_placeholders() {
        let index = index();
        let mouse = index.create_entity(&[&INPUT, &PHYSICS], "Mouse").unwrap();
        for system in [&INPUT, &PHYSICS] {
            let component = index.get_component(&mouse, system).unwrap();
            assert!(component.is::<Placeholder>());
            assert_eq!(component.id(), ComponentId::from(mouse.id()));
        }
    }

    #[test]
    fn create_entity_with_unknown_system_writes_nothing() {
        let index = index();
        let unknown = AssociatedSystem::new("AUDIO");
        let err = index.create_entity(&[&INPUT, &unknown], "Speaker").unwrap_err();
        assert_eq!(err, WorldError::UnknownSystem { system: unknown.id() });
        assert!(!index.is_entity(&Entity::new("Speaker")));
        assert!(index.memory_map_of(&INPUT).unwrap().is_empty());
    }

    #[test]
    fn recreating_an_entity_keeps_registered_components() {
        let index = index();
        let mouse = index.create_entity(&[&INPUT], "Mouse").unwrap();
        let module: ComponentRef = Arc::new(Module::for_entity(&mouse));
        index.register(&mouse, module.clone(), &INPUT).unwrap();

        index.create_entity(&[&INPUT], "Mouse").unwrap();
        assert!(index.has_same_component(&mouse, &INPUT, &module));
    }

    #[test]
    fn register_requires_system_and_entity() {
        let index = index();
        let ghost = Entity::new("Ghost");
        let component: ComponentRef = Arc::new(Placeholder::new(ComponentId::from_raw(1)));
        assert_eq!(
            index.register(&ghost, component.clone(), &INPUT).unwrap_err(),
            WorldError::UnknownEntity { entity: ghost.id() }
        );

        let audio = AssociatedSystem::new("AUDIO");
        index.create_entity(&[], "Ghost").unwrap();
        assert_eq!(
            index.register(&ghost, component, &audio).unwrap_err(),
            WorldError::UnknownSystem { system: audio.id() }
        );
    }

    #[test]
    fn register_replaces_and_unregister_removes() {
        let index = index();
        let mouse = index.create_entity(&[&INPUT], "Mouse").unwrap();
        let first: ComponentRef = Arc::new(Placeholder::new(ComponentId::from_raw(1)));
        let second: ComponentRef = Arc::new(Placeholder::new(ComponentId::from_raw(2)));

        index.register(&mouse, first.clone(), &INPUT).unwrap();
        let previous = index.register(&mouse, second.clone(), &INPUT).unwrap().unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert_eq!(index.memory_map_of(&INPUT).unwrap().len(), 1);

        assert!(index.unregister(&mouse, &INPUT).unwrap().is_some());
        assert!(index.unregister(&mouse, &INPUT).unwrap().is_none());
        assert!(index.get_component(&mouse, &INPUT).unwrap_err().is_not_found());
    }

    #[test]
    fn entity_components_scans_every_row() {
        let index = index();
        let mouse = index.create_entity(&[&INPUT, &PHYSICS], "Mouse").unwrap();
        index.create_entity(&[&PHYSICS], "Ball").unwrap();

        let view = index.entity_components(&mouse).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.contains_key(&INPUT.id()));
        assert!(view.contains_key(&PHYSICS.id()));
    }

    #[test]
    fn destroy_entity_detaches_from_all_rows() {
        let index = index();
        let mouse = index.create_entity(&[&INPUT, &PHYSICS], "Mouse").unwrap();
        let mut detached = index.destroy_entity(&mouse).unwrap();
        detached.sort();
        let mut expected = vec![INPUT.id(), PHYSICS.id()];
        expected.sort();
        assert_eq!(detached, expected);
        assert!(!index.is_entity(&mouse));
        assert_eq!(index.entity_count(), 0);
    }

    #[test]
    fn register_memory_map_validates_keys() {
        let index = index();
        let mouse = index.create_entity(&[], "Mouse").unwrap();
        let placeholder = |raw| -> ComponentRef { Arc::new(Placeholder::new(ComponentId::from_raw(raw))) };
        let row: EntityComponentMap = [(mouse.id(), placeholder(9))].into_iter().collect();
        let previous = index.register_memory_map(&INPUT, row).unwrap();
        assert!(previous.is_some());
        assert!(index.has_component(&mouse, &INPUT));

        let ghost = Entity::new("Ghost");
        let row = [(mouse.id(), placeholder(9)), (ghost.id(), placeholder(10))]
            .into_iter()
            .collect();
        assert_eq!(
            index.register_memory_map(&PHYSICS, row).unwrap_err(),
            WorldError::UnknownEntity { entity: ghost.id() }
        );
        let audio = AssociatedSystem::new("AUDIO");
        assert!(index.register_memory_map(&audio, EntityComponentMap::new()).unwrap().is_none());
        assert!(index.has_memory_map(&audio));
    }

    #[test]
    fn release_memory_map_forgets_row() {
        let index = index();
        index.release_memory_map(&PHYSICS).unwrap();
        assert!(!index.has_memory_map(&PHYSICS));
        assert_eq!(
            index.release_memory_map(&PHYSICS).unwrap_err(),
            WorldError::UnknownSystem { system: PHYSICS.id() }
        );
        index.allocate_memory_map(&PHYSICS).unwrap();
    }

    // "n512789" and "n749192" both spread-hash to 0xeb035a48.
    const FIRST: &str = "n512789";
    const SECOND: &str = "n749192";

    #[test]
    fn colliding_names_share_an_id() {
        assert_eq!(Entity::new(FIRST).id(), Entity::new(SECOND).id());
        assert_eq!(Entity::new(FIRST).id().raw(), 0xeb03_5a48);
        assert_eq!(AssociatedSystem::new(FIRST).id(), AssociatedSystem::new(SECOND).id());
    }

    #[test]
    fn colliding_entity_cannot_touch_the_original() {
        let index = index();
        let original = index.create_entity(&[&INPUT], FIRST).unwrap();
        let stored = index.get_component(&original, &INPUT).unwrap();

        let expected = WorldError::IdCollision {
            id: original.id().raw(),
            existing: FIRST.into(),
            requested: SECOND.into(),
        };
        assert_eq!(index.create_entity(&[&INPUT], SECOND).unwrap_err(), expected);

        let intruder = Entity::new(SECOND);
        let component: ComponentRef = Arc::new(Placeholder::new(ComponentId::from_raw(3)));
        assert_eq!(index.get_component(&intruder, &INPUT).unwrap_err(), expected);
        assert_eq!(index.register(&intruder, component, &INPUT).unwrap_err(), expected);
        assert_eq!(index.unregister(&intruder, &INPUT).unwrap_err(), expected);
        assert_eq!(index.entity_components(&intruder).unwrap_err(), expected);
        assert_eq!(index.destroy_entity(&intruder).unwrap_err(), expected);
        assert!(!index.is_entity(&intruder));

        assert!(index.has_same_component(&original, &INPUT, &stored));
        assert_eq!(index.entity_count(), 1);
    }

    #[test]
    fn colliding_system_cannot_reach_the_original_row() {
        let index = index();
        let original = AssociatedSystem::new(FIRST);
        let intruder = AssociatedSystem::new(SECOND);
        index.allocate_memory_map(&original).unwrap();
        let mouse = index.create_entity(&[&original], "Mouse").unwrap();

        let expected = WorldError::IdCollision {
            id: original.id().raw(),
            existing: FIRST.into(),
            requested: SECOND.into(),
        };
        let component: ComponentRef = Arc::new(Placeholder::new(ComponentId::from_raw(4)));
        assert_eq!(index.allocate_memory_map(&intruder).unwrap_err(), expected);
        assert_eq!(index.create_entity(&[&intruder], "Pad").unwrap_err(), expected);
        assert_eq!(index.register(&mouse, component, &intruder).unwrap_err(), expected);
        assert_eq!(index.unregister(&mouse, &intruder).unwrap_err(), expected);
        assert_eq!(index.get_component(&mouse, &intruder).unwrap_err(), expected);
        assert_eq!(index.memory_map_of(&intruder).unwrap_err(), expected);
        assert_eq!(index.release_memory_map(&intruder).unwrap_err(), expected);
        assert_eq!(
            index.register_memory_map(&intruder, EntityComponentMap::new()).unwrap_err(),
            expected
        );
        assert!(!index.has_memory_map(&intruder));
        assert!(!index.is_entity(&Entity::new("Pad")));

        assert!(index.has_memory_map(&original));
        assert!(index.get_component(&mouse, &original).unwrap().is::<Placeholder>());
    }

    #[test]
    fn released_system_id_can_be_claimed_by_another_name() {
        let index = index();
        index.allocate_memory_map(&AssociatedSystem::new(FIRST)).unwrap();
        index.release_memory_map(&AssociatedSystem::new(FIRST)).unwrap();
        index.allocate_memory_map(&AssociatedSystem::new(SECOND)).unwrap();
        assert!(!index.has_memory_map(&AssociatedSystem::new(FIRST)));
        assert!(index.has_memory_map(&AssociatedSystem::new(SECOND)));
    }
}
