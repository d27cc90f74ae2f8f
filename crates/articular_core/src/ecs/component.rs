// component.rs - Component capability and named field access
//
// Components are identified by an explicit ComponentId chosen at allocation
// time, never by their payload. Payload fields are only queryable when the
// component lists them through `field`, usually via `define_component!`.

use crate::ecs::{ComponentId, Module, WorldError, WorldResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle stored in both indexes.
pub type ComponentRef = Arc<dyn Component>;

/// Value of a queryable component field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Id(ComponentId),
}

macro_rules! field_value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::$variant(value.into())
                }
            }
        )+
    };
}

field_value_from!(Int: i8, i16, i32, i64);
field_value_from!(UInt: u8, u16, u32, u64);
field_value_from!(Float: f32, f64);
field_value_from!(Text: String, &str);

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::UInt(value as u64)
    }
}

impl From<ComponentId> for FieldValue {
    fn from(value: ComponentId) -> Self {
        FieldValue::Id(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v}"),
            FieldValue::Id(v) => write!(f, "{v}"),
        }
    }
}

/// A unit of per-entity, per-system data.
///
/// Implementors must be `Send + Sync`; a component is shared between the
/// primary index and its cache mirror. Mutable payloads need their own
/// interior mutability.
pub trait Component: Send + Sync + 'static {
    /// Identifier assigned when this component was allocated.
    fn id(&self) -> ComponentId;

    /// Read a named payload field. `None` means the field is not exposed.
    fn field(&self, _name: &str) -> Option<FieldValue> {
        None
    }

    /// Names accepted by [`field`](Component::field).
    fn field_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Type-erased view for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Modules override this to expose their sub-components.
    fn as_module(&self) -> Option<&Module> {
        None
    }
}

impl dyn Component {
    /// Fetch a named field, failing instead of substituting a default.
    pub fn get_data(&self, name: &str) -> WorldResult<FieldValue> {
        self.field(name).ok_or_else(|| WorldError::FieldNotFound {
            field: name.to_string(),
        })
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Component");
        out.field("id", &self.id());
        for name in self.field_names() {
            if let Some(value) = self.field(name) {
                out.field(name, &value);
            }
        }
        out.finish()
    }
}

/// Whether two handles point at the same component instance.
pub fn same_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    Arc::ptr_eq(a, b)
}

/// Component carrying only its identifier.
///
/// Allocated by `create_entity` under every system the entity joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placeholder {
    id: ComponentId,
}

impl Placeholder {
    pub fn new(id: ComponentId) -> Self {
        Self { id }
    }
}

impl Component for Placeholder {
    fn id(&self) -> ComponentId {
        self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Id(self.id)),
            _ => None,
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        &["id"]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Implement [`Component`] for a plain struct.
///
/// The `id` arm binds the instance to a name of your choice and evaluates to
/// its [`ComponentId`]; `fields` lists the members exposed by name. Each
/// listed field must be `Clone` and convertible into [`FieldValue`].
///
/// # Example
/// ```ignore
/// struct Button { pin: u32, pressed: bool }
///
/// define_component! {
///     Button,
///     id(button) => ComponentId::derive(button.pin),
///     fields { pin, pressed }
/// }
/// ```
#[macro_export]
macro_rules! define_component {
    (
        $ty:ty,
        id($this:ident) => $id:expr,
        fields { $($field:ident),* $(,)? } $(,)?
    ) => {
        impl $crate::ecs::Component for $ty {
            fn id(&self) -> $crate::ecs::ComponentId {
                let $this = self;
                $id
            }

            fn field(&self, name: &str) -> ::core::option::Option<$crate::ecs::FieldValue> {
                match name {
                    $(
                        stringify!($field) => ::core::option::Option::Some(
                            $crate::ecs::FieldValue::from(::core::clone::Clone::clone(&self.$field)),
                        ),
                    )*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[$(stringify!($field)),*]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::define_component;

    struct Scroll {
        pin: u32,
        resolution: i32,
        label: String,
        hidden: u8,
    }

    define_component! {
        Scroll,
        id(scroll) => ComponentId::derive(scroll.pin),
        fields { pin, resolution, label }
    }

    fn scroll() -> ComponentRef {
        Arc::new(Scroll {
            pin: 2,
            resolution: 120,
            label: "wheel".into(),
            hidden: 9,
        })
    }

    #[test]
    fn listed_fields_are_queryable() {
        let component = scroll();
        assert_eq!(component.get_data("pin"), Ok(FieldValue::UInt(2)));
        assert_eq!(component.get_data("resolution"), Ok(FieldValue::Int(120)));
        assert_eq!(
            component.get_data("label"),
            Ok(FieldValue::Text("wheel".into()))
        );
        assert_eq!(component.field_names(), &["pin", "resolution", "label"]);
    }

    #[test]
    fn unlisted_field_is_not_found() {
        let component = scroll();
        assert_eq!(
            component.get_data("hidden"),
            Err(WorldError::FieldNotFound {
                field: "hidden".into()
            })
        );
        let concrete = component.downcast_ref::<Scroll>().unwrap();
        assert_eq!(concrete.hidden, 9);
    }

    #[test]
    fn id_comes_from_the_id_arm() {
        assert_eq!(scroll().id(), ComponentId::derive(2));
    }

    #[test]
    fn placeholder_exposes_only_its_id() {
        let id = ComponentId::from_raw(42);
        let component: ComponentRef = Arc::new(Placeholder::new(id));
        assert!(component.is::<Placeholder>());
        assert_eq!(component.get_data("id"), Ok(FieldValue::Id(id)));
        assert!(component.as_module().is_none());
    }

    #[test]
    fn identity_is_pointer_identity() {
        let a = scroll();
        let b = a.clone();
        assert!(same_component(&a, &b));
        assert!(!same_component(&a, &scroll()));
    }
}
