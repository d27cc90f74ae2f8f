//! World configuration.

use serde::{Deserialize, Serialize};

/// Options fixed at [`World`](crate::ecs::World) construction.
///
/// Every field has a default, so a partial JSON object is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maintain the Entity -> System -> Component cache index.
    pub caching: bool,
    /// Serialize writes behind one lock so both indexes always agree.
    ///
    /// When off, concurrent writes to the same slot may leave the cache
    /// briefly out of step with the primary index.
    pub serialize_writes: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            caching: true,
            serialize_writes: true,
        }
    }
}

impl WorldConfig {
    /// Default configuration without the cache index.
    pub fn uncached() -> Self {
        Self {
            caching: false,
            ..Self::default()
        }
    }
}
