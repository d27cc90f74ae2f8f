//! Identifier derivation shared by entities, components and systems.
//!
//! Every identifier is a 32-bit value. Names are hashed with FNV-1a and the
//! result is passed through [`spread_hash`], which folds the upper 16 bits
//! into the lower 16 so maps that truncate keys to a narrow index space still
//! see the entropy of the high half.
//!
//! Each domain gets its own newtype so an [`EntityId`] can never be used where
//! a [`SystemId`] is expected. The one sanctioned crossing is
//! `ComponentId::from(EntityId)`, used for placeholder components and module keys.

use serde::{Deserialize, Serialize};
use std::fmt;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Fold the most significant 16 bits into the least significant 16 bits.
///
/// Pure and total. Distinct seeds can still collide after spreading; the
/// primary index detects collisions between *names* and rejects them.
#[inline]
pub const fn spread_hash(seed: u32) -> u32 {
    (seed >> 16) ^ seed
}

/// Stable 32-bit FNV-1a hash of a name.
pub const fn name_seed(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Wrap an already-spread raw identifier.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Spread an arbitrary seed into an identifier.
            #[inline]
            pub const fn derive(seed: u32) -> Self {
                Self(spread_hash(seed))
            }

            /// Derive the identifier owned by `name`.
            #[inline]
            pub const fn from_name(name: &str) -> Self {
                Self::derive(name_seed(name))
            }

            /// Return the raw value backing this identifier.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#010x}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Entity`](crate::ecs::Entity), derived from its name.
    EntityId
);
define_id!(
    /// Identifier of a component, assigned once when the component is allocated.
    ComponentId
);
define_id!(
    /// Identifier of an associated system; the outer key of the primary index.
    SystemId
);

impl From<EntityId> for ComponentId {
    fn from(entity: EntityId) -> Self {
        ComponentId::from_raw(entity.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_folds_high_bits() {
        assert_eq!(spread_hash(0), 0);
        assert_eq!(spread_hash(0x0001_0000), 0x0001_0001);
        assert_eq!(spread_hash(0xffff_0000), 0xffff_ffff);
        assert_eq!(spread_hash(0x0000_1234), 0x0000_1234);
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(name_seed(""), 0x811c_9dc5);
        assert_eq!(name_seed("a"), 0xe40c_292c);
        assert_eq!(name_seed("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(EntityId::from_name("Mouse"), EntityId::from_name("Mouse"));
        assert_ne!(EntityId::from_name("Mouse"), EntityId::from_name("Keyboard"));
        assert_eq!(
            EntityId::from_name("Mouse").raw(),
            spread_hash(name_seed("Mouse"))
        );
    }

    #[test]
    fn entity_id_converts_to_component_id() {
        let entity = EntityId::from_name("Sensors");
        assert_eq!(ComponentId::from(entity).raw(), entity.raw());
    }

    #[test]
    fn ids_are_const_constructible() {
        const INPUT: SystemId = SystemId::from_name("INPUT");
        assert_eq!(INPUT, SystemId::from_name("INPUT"));
    }
}
