//! Cross-system data handoff.
//!
//! A data pipe is a single-argument pure function registered under an id,
//! conventionally the id of the module that produces the data. There is no
//! buffering and no subscriber list: registering twice under one id replaces
//! the first pipe, and fetching after unregistration fails.

use crate::ecs::{ComponentId, MemoryMap, WorldError, WorldResult};
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Typed `A -> T` computation channel.
pub struct DataPipe<A, T> {
    id: ComponentId,
    func: Arc<dyn Fn(A) -> T + Send + Sync>,
}

impl<A, T> DataPipe<A, T> {
    pub fn new<F>(id: ComponentId, func: F) -> Self
    where
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        Self {
            id,
            func: Arc::new(func),
        }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Run the pipe on `argument`.
    #[inline]
    pub fn apply(&self, argument: A) -> T {
        (self.func)(argument)
    }
}

impl<A, T> Clone for DataPipe<A, T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            func: Arc::clone(&self.func),
        }
    }
}

impl<A, T> fmt::Debug for DataPipe<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPipe")
            .field("id", &self.id)
            .field("maps", &type_name::<fn(A) -> T>())
            .finish()
    }
}

type ErasedPipe = Arc<dyn Any + Send + Sync>;

/// Registry of data pipes keyed by id.
#[derive(Default)]
pub struct DataPipeRegistry {
    pipes: MemoryMap<ComponentId, ErasedPipe>,
}

impl DataPipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pipe` under its own id. Last write wins.
    pub fn register<A, T>(&self, pipe: DataPipe<A, T>)
    where
        A: 'static,
        T: 'static,
    {
        self.register_as(pipe.id(), pipe);
    }

    /// Register `pipe` under an external id. Last write wins.
    pub fn register_as<A, T>(&self, id: ComponentId, pipe: DataPipe<A, T>)
    where
        A: 'static,
        T: 'static,
    {
        if self.pipes.insert(id, Arc::new(pipe)).is_some() {
            debug!(%id, "data pipe replaced");
        } else {
            debug!(%id, "data pipe registered");
        }
    }

    /// Remove the pipe at `id`; returns whether one was present.
    pub fn unregister(&self, id: ComponentId) -> bool {
        let removed = self.pipes.remove(&id).is_some();
        if removed {
            debug!(%id, "data pipe unregistered");
        }
        removed
    }

    /// Fetch the pipe at `id`, checking that it maps `A -> T`.
    pub fn get<A, T>(&self, id: ComponentId) -> WorldResult<DataPipe<A, T>>
    where
        A: 'static,
        T: 'static,
    {
        let erased = self
            .pipes
            .get(&id)
            .ok_or(WorldError::DataPipeNotFound { id })?;
        erased
            .downcast_ref::<DataPipe<A, T>>()
            .cloned()
            .ok_or(WorldError::DataPipeTypeMismatch {
                id,
                expected: type_name::<fn(A) -> T>(),
            })
    }

    /// Fetch and run the pipe at `id` in one step.
    pub fn apply<A, T>(&self, id: ComponentId, argument: A) -> WorldResult<T>
    where
        A: 'static,
        T: 'static,
    {
        Ok(self.get::<A, T>(id)?.apply(argument))
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.pipes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }
}

impl fmt::Debug for DataPipeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataPipeRegistry")
            .field("pipes", &self.pipes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSOR: ComponentId = ComponentId::from_raw(0x5e5);

    #[test]
    fn round_trip_then_unregister() {
        let registry = DataPipeRegistry::new();
        let pipe = DataPipe::new(SENSOR, |signal: f32| signal * 0.005 * 2.0);
        registry.register(pipe.clone());

        let fetched = registry.get::<f32, f32>(SENSOR).unwrap();
        assert_eq!(fetched.apply(100.0), pipe.apply(100.0));
        assert_eq!(registry.apply::<f32, f32>(SENSOR, 0.33), Ok(pipe.apply(0.33)));

        assert!(registry.unregister(SENSOR));
        assert!(!registry.unregister(SENSOR));
        assert_eq!(
            registry.get::<f32, f32>(SENSOR).unwrap_err(),
            WorldError::DataPipeNotFound { id: SENSOR }
        );
    }

    #[test]
    fn second_registration_wins() {
        let registry = DataPipeRegistry::new();
        registry.register(DataPipe::new(SENSOR, |x: i32| x + 1));
        registry.register(DataPipe::new(SENSOR, |x: i32| x * 10));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.apply::<i32, i32>(SENSOR, 4), Ok(40));
    }

    #[test]
    fn wrong_signature_is_reported() {
        let registry = DataPipeRegistry::new();
        registry.register_as(SENSOR, DataPipe::new(SENSOR, |x: i32| x as f64));
        let err = registry.get::<i32, i32>(SENSOR).unwrap_err();
        assert!(matches!(err, WorldError::DataPipeTypeMismatch { id, .. } if id == SENSOR));
        assert!(!err.is_not_found());
    }
}
