//! # Component System
//!
//! Components are pure data containers with no behavior.
//! Any `'static` type can become a component by implementing the
//! [`Component`] marker trait; entities store them type-erased and
//! hand them back through checked downcasts.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for ECS components.
///
/// Signals travelling through the signal bus are components too: a signal's
/// type decides which listeners receive it.
///
/// # Example
///
/// ```rust
/// use tessera_core::Component;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: AsAny + fmt::Debug {}

/// Upcasting helpers so `dyn Component` can be downcast to its concrete type.
///
/// Blanket-implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Converts the box into `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    /// Returns the fully qualified name of the concrete type.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Component {
    /// Returns the [`ComponentType`] of the concrete value behind this reference.
    #[must_use]
    pub fn component_type(&self) -> ComponentType {
        ComponentType {
            id: self.as_any().type_id(),
            name: self.type_name(),
        }
    }

    /// Checks if the concrete value is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to `&T` if the concrete value is a `T`.
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to `&mut T` if the concrete value is a `T`.
    #[inline]
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Identity of a component kind.
///
/// Two `ComponentType`s are equal exactly when they describe the same Rust
/// type. The type name is carried only for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Returns the component type of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }

    /// Returns the unqualified type name, e.g. `Position`.
    #[must_use]
    pub fn name(self) -> &'static str {
        short_name(self.name)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strips the module path from a type name, keeping generic arguments intact.
pub(crate) fn short_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// A component paired with its type, ready to be stored in an entity.
pub type BoxedComponent = (ComponentType, Box<dyn Component>);

/// A set of components that can be attached to an entity in one call.
///
/// Implemented for tuples of up to eight components, for `()` and for
/// `Vec<Box<dyn Component>>` when the set is only known at runtime.
pub trait Bundle {
    /// Converts the bundle into typed, boxed components.
    fn into_components(self) -> Vec<BoxedComponent>;
}

impl Bundle for () {
    fn into_components(self) -> Vec<BoxedComponent> {
        Vec::new()
    }
}

impl Bundle for Vec<Box<dyn Component>> {
    fn into_components(self) -> Vec<BoxedComponent> {
        self.into_iter()
            .map(|component| (component.as_ref().component_type(), component))
            .collect()
    }
}

macro_rules! impl_bundle {
    ($($name:ident),+) => {
        impl<$($name: Component),+> Bundle for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_components(self) -> Vec<BoxedComponent> {
                let ($($name,)+) = self;
                vec![$((ComponentType::of::<$name>(), Box::new($name) as Box<dyn Component>)),+]
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);
