use crate::ecs::SystemId;
use std::borrow::Cow;
use std::fmt;

/// Runtime object carrying an associated-system identity.
///
/// Enums naming a fixed set of systems implement this directly; ad-hoc systems
/// can use [`AssociatedSystem`]. Updaters are system controllers too, which is
/// how dispatch finds the row they own.
pub trait SystemController: Send + Sync {
    /// Unique name of the associated system.
    fn associated_system(&self) -> &str;

    /// Identifier derived from [`associated_system`](Self::associated_system).
    fn system_id(&self) -> SystemId {
        SystemId::from_name(self.associated_system())
    }
}

/// Named system identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssociatedSystem {
    name: Cow<'static, str>,
    id: SystemId,
}

impl AssociatedSystem {
    /// Create a system identity from a static name (usable in `const`).
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            id: SystemId::from_name(name),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = SystemId::from_name(&name);
        Self {
            name: Cow::Owned(name),
            id,
        }
    }

    #[inline]
    pub fn id(&self) -> SystemId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SystemController for AssociatedSystem {
    fn associated_system(&self) -> &str {
        &self.name
    }

    fn system_id(&self) -> SystemId {
        self.id
    }
}

impl fmt::Display for AssociatedSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.id)
    }
}
