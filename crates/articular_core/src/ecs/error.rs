use crate::ecs::{ComponentId, EntityId, SystemId};
use thiserror::Error;

/// Errors reported by the primary index, the cache index and the data pipe registry.
///
/// Every variant is a local, recoverable condition. Lookups never substitute a
/// default value for a missing entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("system {system} has no allocated memory map")]
    UnknownSystem { system: SystemId },

    #[error("entity {entity} was never created")]
    UnknownEntity { entity: EntityId },

    #[error("no component for entity {entity} under system {system}")]
    ComponentNotFound { entity: EntityId, system: SystemId },

    #[error("entity {entity} has no cache row")]
    CacheRowNotFound { entity: EntityId },

    #[error("no data pipe registered under {id}")]
    DataPipeNotFound { id: ComponentId },

    #[error("data pipe {id} does not map {expected}")]
    DataPipeTypeMismatch { id: ComponentId, expected: &'static str },

    #[error("memory map for {key} is already allocated")]
    DuplicateRegistration { key: String },

    #[error("component has no queryable field '{field}'")]
    FieldNotFound { field: String },

    #[error("identifier {id:#010x} is claimed by '{existing}', cannot assign it to '{requested}'")]
    IdCollision {
        id: u32,
        existing: String,
        requested: String,
    },

    #[error("caching is disabled")]
    CachingDisabled,
}

impl WorldError {
    /// Whether this is one of the "nothing stored at that key" failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WorldError::ComponentNotFound { .. }
                | WorldError::CacheRowNotFound { .. }
                | WorldError::DataPipeNotFound { .. }
        )
    }
}

pub type WorldResult<T> = Result<T, WorldError>;
