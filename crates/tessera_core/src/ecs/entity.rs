//! # Entity Management
//!
//! An entity is an identity plus a map from [`ComponentType`] to the single
//! component of that type it holds.

use std::collections::HashMap;
use std::fmt;

use super::component::{BoxedComponent, Bundle, Component, ComponentType};

/// Unique identifier for an entity.
///
/// Ids are issued by a [`Store`](super::Store) from a monotonic counter
/// starting at 1 and are never reused, even when the slot they lived in is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity and the components attached to it.
///
/// At most one component of each type is held; adding a component of a type
/// already present replaces the previous value.
#[derive(Debug)]
pub struct Entity {
    /// The unique identifier for this entity.
    id: EntityId,
    /// Attached components keyed by their type.
    components: HashMap<ComponentType, Box<dyn Component>>,
}

impl Entity {
    /// Creates a new entity with the given components.
    #[must_use]
    pub fn new<B: Bundle>(id: EntityId, bundle: B) -> Self {
        Self::with_components(id, bundle.into_components())
    }

    pub(crate) fn with_components(id: EntityId, components: Vec<BoxedComponent>) -> Self {
        Self {
            id,
            components: components.into_iter().collect(),
        }
    }

    /// Returns the id of this entity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Adds a component, replacing any existing one of the same type.
    pub fn add<C: Component>(&mut self, component: C) -> &mut Self {
        self.components
            .insert(ComponentType::of::<C>(), Box::new(component));
        self
    }

    /// Sets a component; identical to [`Entity::add`].
    pub fn set<C: Component>(&mut self, component: C) -> &mut Self {
        self.add(component)
    }

    /// Gets the component of type `C`.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components
            .get(&ComponentType::of::<C>())
            .and_then(|component| component.downcast_ref::<C>())
    }

    /// Gets the component of type `C` mutably.
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(&ComponentType::of::<C>())
            .and_then(|component| component.downcast_mut::<C>())
    }

    /// Gets a component by its runtime type.
    #[must_use]
    pub fn get_dyn(&self, component_type: ComponentType) -> Option<&dyn Component> {
        self.components.get(&component_type).map(|component| &**component)
    }

    /// Removes the component of type `C`, returning it if it was present.
    ///
    /// Crate-private: removing the last component turns the entity into a
    /// tombstone, which only the store may do. Callers go through
    /// [`Store::remove_component`](super::Store::remove_component).
    pub(crate) fn remove<C: Component>(&mut self) -> Option<C> {
        let boxed = self.components.remove(&ComponentType::of::<C>())?;
        boxed.into_any().downcast::<C>().ok().map(|component| *component)
    }

    /// Checks that the entity holds every one of the given types.
    ///
    /// An empty list always matches.
    #[must_use]
    pub fn contains(&self, types: &[ComponentType]) -> bool {
        types.iter().all(|t| self.components.contains_key(t))
    }

    /// Checks that the entity holds none of the given types.
    #[must_use]
    pub fn not_contains(&self, types: &[ComponentType]) -> bool {
        !types.iter().any(|t| self.components.contains_key(t))
    }

    /// Checks whether the entity has no components, i.e. is a tombstone.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns the number of components attached.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterates over the types of the attached components.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.components.keys().copied()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity{{id{{{}}}", self.id)?;
        // Map order is unspecified; sort by name so output is stable.
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort_by_key(|(component_type, _)| component_type.name());
        for (_, component) in components {
            write!(f, ",{component:?}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Pos {
        x: f32,
        y: f32,
    }
    impl Component for Pos {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Vel {
        x: f32,
        y: f32,
    }
    impl Component for Vel {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Tag;
    impl Component for Tag {}

    fn pos() -> ComponentType {
        ComponentType::of::<Pos>()
    }

    fn vel() -> ComponentType {
        ComponentType::of::<Vel>()
    }

    #[test]
    fn test_new_with_components() {
        let entity = Entity::new(EntityId::new(1), (Pos { x: 1.0, y: 2.0 }, Vel { x: 3.0, y: 4.0 }));
        assert_eq!(entity.id(), EntityId::new(1));
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.get::<Pos>(), Some(&Pos { x: 1.0, y: 2.0 }));
        assert_eq!(entity.get::<Vel>(), Some(&Vel { x: 3.0, y: 4.0 }));
        assert_eq!(entity.get::<Tag>(), None);
    }

    #[test]
    fn test_set_replaces() {
        let mut entity = Entity::new(EntityId::new(1), (Pos { x: 0.0, y: 0.0 },));
        entity.set(Pos { x: 5.0, y: 5.0 }).add(Tag);
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.get::<Pos>(), Some(&Pos { x: 5.0, y: 5.0 }));
    }

    #[test]
    fn test_get_mut() {
        let mut entity = Entity::new(EntityId::new(1), (Pos { x: 0.0, y: 0.0 },));
        if let Some(p) = entity.get_mut::<Pos>() {
            p.x = 9.0;
        }
        assert_eq!(entity.get::<Pos>().map(|p| p.x), Some(9.0));
    }

    #[test]
    fn test_contains() {
        let entity = Entity::new(EntityId::new(1), (Pos { x: 0.0, y: 0.0 }, Tag));
        assert!(entity.contains(&[]));
        assert!(entity.contains(&[pos()]));
        assert!(!entity.contains(&[pos(), vel()]));
        assert!(entity.not_contains(&[vel()]));
        assert!(!entity.not_contains(&[vel(), pos()]));
    }

    #[test]
    fn test_remove() {
        let mut entity = Entity::new(EntityId::new(1), (Pos { x: 1.0, y: 1.0 }, Vel { x: 2.0, y: 2.0 }));
        assert_eq!(entity.remove::<Pos>(), Some(Pos { x: 1.0, y: 1.0 }));
        assert_eq!(entity.remove::<Pos>(), None);
        assert!(!entity.is_empty());
        entity.remove::<Vel>();
        assert!(entity.is_empty());
    }

    #[test]
    fn test_display() {
        let entity = Entity::new(EntityId::new(7), (Tag, Pos { x: 1.0, y: 2.0 }));
        assert_eq!(entity.to_string(), "Entity{id{7},Pos { x: 1.0, y: 2.0 },Tag}");
    }
}
