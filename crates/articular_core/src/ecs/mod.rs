//! Dual-indexed entity component store.
//!
//! Components live in a primary index keyed System -> Entity -> Component.
//! A cache index keyed Entity -> System -> Component mirrors every write so
//! per-entity views need no scan. [`World`] owns both and keeps them in step;
//! [`PrimaryIndex`] can be used on its own when no cache is wanted.
//!
//! Identifiers are 32-bit hashes of names, see [`spread_hash`]. Updaters are
//! driven by the host loop through the three dispatch contracts in
//! [`SystemsUpdater`], [`SystemEntitiesUpdater`] and [`ComponentUpdater`].

mod cache;
mod component;
mod data_pipe;
mod entity;
mod error;
mod id;
mod lookup;
mod manager;
mod memory_map;
mod module;
mod primary;
mod system;
mod updater;
mod world;

pub use cache::CacheIndex;
pub use component::{same_component, Component, ComponentRef, FieldValue, Placeholder};
pub use data_pipe::{DataPipe, DataPipeRegistry};
pub use entity::Entity;
pub use error::{WorldError, WorldResult};
pub use id::{name_seed, spread_hash, ComponentId, EntityId, SystemId};
pub use manager::Manager;
pub use memory_map::{
    CacheMap, ComponentMap, EntityComponentMap, MemoryMap, SystemComponentMap, SystemMap,
};
pub use module::Module;
pub use primary::PrimaryIndex;
pub use system::{AssociatedSystem, SystemController};
pub use updater::{ComponentUpdater, SystemEntitiesUpdater, SystemsUpdater};
pub use world::World;
