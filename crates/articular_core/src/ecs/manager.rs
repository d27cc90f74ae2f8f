use crate::ecs::{
    ComponentRef, DataPipeRegistry, Entity, SystemComponentMap, SystemController, WorldResult,
};

/// Read/write surface handed to updaters.
///
/// Writes made through this trait follow the same path as the owner's own
/// API, so a [`World`](crate::ecs::World) keeps its cache mirror in step.
pub trait Manager: Send + Sync {
    /// Authoritative component lookup.
    fn component(&self, entity: &Entity, system: &dyn SystemController) -> WorldResult<ComponentRef>;

    /// Copy of one entity's components across every system.
    fn components_of(&self, entity: &Entity) -> WorldResult<SystemComponentMap>;

    fn register(
        &self,
        entity: &Entity,
        component: ComponentRef,
        system: &dyn SystemController,
    ) -> WorldResult<Option<ComponentRef>>;

    fn unregister(
        &self,
        entity: &Entity,
        system: &dyn SystemController,
    ) -> WorldResult<Option<ComponentRef>>;

    fn data_pipes(&self) -> &DataPipeRegistry;
}
