//! # Entity Store
//!
//! A growable array of entity slots with free-slot reuse.
//!
//! The store guarantees:
//! - Entity ids strictly increase and are never reused, even though slots are
//! - O(1) lookup from id to slot
//! - Iteration in ascending slot order, skipping free slots
//!
//! ## Slot states
//!
//! ```text
//!   [ Some(entity) | None | Some(entity) | None | None ]
//!                     ^                     ^
//!                 tombstone,             never used,
//!                  reusable              after growth
//! ```
//!
//! An entity without components is a tombstone. The store keeps no such
//! entity in a slot: removing an entity, or removing its last component
//! through [`Store::remove_component`], frees the slot. Components can only
//! leave an entity through the store, so `size`, the lookup and iteration
//! always agree.
//!
//! ## Growth
//!
//! The first growth doubles the capacity; every later growth adds
//! `capacity / 4 + 1` slots.

use std::collections::{BTreeSet, HashMap};
use std::cmp::Ordering;
use std::fmt;

use super::component::{Bundle, Component, ComponentType};
use super::entity::{Entity, EntityId};
use crate::error::{EcsError, EcsResult};

/// Storage for all entities of a world.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, Store};
///
/// #[derive(Debug)]
/// struct Position(f32);
/// impl Component for Position {}
///
/// let mut store = Store::new(16);
/// let id = store.add_entity((Position(1.0),));
/// assert_eq!(store.size(), 1);
/// assert!(store.get(id).is_ok());
/// ```
pub struct Store {
    /// Entity slots. `None` marks a free slot.
    slots: Vec<Option<Entity>>,
    /// Next growth increment.
    grow: usize,
    /// Number of occupied slots.
    size: usize,
    /// Last id handed out.
    last_id: EntityId,
    /// Id to slot index, for occupied slots only.
    lookup: HashMap<EntityId, usize>,
    /// Indices of free slots, lowest first.
    free: BTreeSet<usize>,
}

impl Store {
    /// Creates a new empty store with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            slots,
            // First growth doubles capacity
            grow: capacity,
            size: 0,
            last_id: EntityId::new(0),
            lookup: HashMap::with_capacity(capacity),
            free: (0..capacity).collect(),
        }
    }

    /// Returns the number of slots, occupied or not.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Checks whether the store holds no live entity.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the last id handed out, `0` if none yet.
    #[inline]
    #[must_use]
    pub const fn last_id(&self) -> EntityId {
        self.last_id
    }

    /// Adds an entity with the given components and returns its id.
    ///
    /// The lowest free slot is reused if there is one; otherwise the store
    /// grows and the entity goes into the first new slot.
    ///
    /// An empty bundle still consumes an id, but the entity is born a
    /// tombstone: it takes no slot and is never found.
    pub fn add_entity<B: Bundle>(&mut self, bundle: B) -> EntityId {
        self.last_id = EntityId::new(self.last_id.raw() + 1);
        let id = self.last_id;

        let components = bundle.into_components();
        if components.is_empty() {
            tracing::trace!("entity {} has no components, not stored", id);
            return id;
        }

        if self.free.is_empty() {
            self.grow_capacity();
        }
        let index = self
            .free
            .pop_first()
            .unwrap_or_else(|| unreachable!("store grew but has no free slot"));

        self.slots[index] = Some(Entity::with_components(id, components));
        self.lookup.insert(id, index);
        self.size += 1;
        tracing::trace!("added entity {} at slot {}", id, index);
        id
    }

    /// Removes an entity and frees its slot.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the id was never issued or has
    /// already been removed.
    pub fn remove(&mut self, id: EntityId) -> EcsResult<()> {
        let index = self.lookup.remove(&id).ok_or(EcsError::EntityNotFound(id))?;
        self.release(index);
        tracing::trace!("removed entity {} from slot {}", id, index);
        Ok(())
    }

    /// Removes the component of type `C` from an entity and returns it.
    ///
    /// Removing the last component tombstones the entity, exactly as
    /// [`Store::remove`] does.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the id is not live.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> EcsResult<Option<C>> {
        let index = *self.lookup.get(&id).ok_or(EcsError::EntityNotFound(id))?;
        let entity = self.slots[index]
            .as_mut()
            .ok_or(EcsError::EntityNotFound(id))?;
        let removed = entity.remove::<C>();

        if entity.is_empty() {
            self.lookup.remove(&id);
            self.release(index);
            tracing::trace!("entity {} lost its last component, slot {} freed", id, index);
        }
        Ok(removed)
    }

    /// Gets an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the id is not live.
    pub fn get(&self, id: EntityId) -> EcsResult<&Entity> {
        self.lookup
            .get(&id)
            .and_then(|&index| self.slots[index].as_ref())
            .ok_or(EcsError::EntityNotFound(id))
    }

    /// Gets an entity by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`] if the id is not live.
    pub fn get_mut(&mut self, id: EntityId) -> EcsResult<&mut Entity> {
        match self.lookup.get(&id) {
            Some(&index) => self.slots[index]
                .as_mut()
                .ok_or(EcsError::EntityNotFound(id)),
            None => Err(EcsError::EntityNotFound(id)),
        }
    }

    /// Checks whether the id belongs to a live entity.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.lookup.contains_key(&id)
    }

    /// Iterates over live entities holding every one of `types`, in slot order.
    ///
    /// An empty filter yields every live entity.
    pub fn iter<'a>(&'a self, types: &'a [ComponentType]) -> Iter<'a> {
        Iter {
            slots: self.slots.iter(),
            filter: types,
        }
    }

    /// Mutable counterpart of [`Store::iter`].
    pub fn iter_mut<'a>(&'a mut self, types: &'a [ComponentType]) -> IterMut<'a> {
        IterMut {
            slots: self.slots.iter_mut(),
            filter: types,
        }
    }

    /// Creates a detached cursor over entities holding every one of `types`.
    ///
    /// Unlike [`Store::iter`] the cursor does not borrow the store, so entities
    /// may be added or removed between steps. Such mutations have no snapshot
    /// isolation: the cursor resumes from the slot after the last one it
    /// returned and sees the store as it is at that moment. It never yields a
    /// removed entity.
    #[must_use]
    pub fn cursor(&self, types: &[ComponentType]) -> Cursor {
        Cursor {
            next: 0,
            filter: types.to_vec(),
        }
    }

    /// Sorts live entities in place by `compare`.
    ///
    /// Free slots always sort after every live entity. The sort is stable.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Entity, &Entity) -> Ordering,
    {
        self.slots.sort_by(|a, b| match (a, b) {
            (Some(a), Some(b)) => compare(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        self.reindex();
    }

    /// Sorts live entities with a `less` predicate.
    pub fn sort<F>(&mut self, mut less: F)
    where
        F: FnMut(&Entity, &Entity) -> bool,
    {
        self.sort_by(|a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
    }

    /// Removes every entity. Issued ids stay retired.
    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
        self.lookup.clear();
        self.free = (0..self.slots.len()).collect();
        self.size = 0;
        tracing::debug!("store cleared, last id {}", self.last_id);
    }

    /// Returns the entity at a slot index, if the slot is occupied.
    pub(crate) fn slot(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Frees an occupied slot. The caller has already dropped its lookup entry.
    fn release(&mut self, index: usize) {
        self.slots[index] = None;
        self.free.insert(index);
        self.size -= 1;
    }

    /// Increases capacity by the current increment.
    fn grow_capacity(&mut self) {
        let old = self.slots.len();
        let new = old + self.grow;
        self.slots.resize_with(new, || None);
        self.free.extend(old..new);
        // Next grow will be 25% + 1
        self.grow = (new >> 2) + 1;
        tracing::debug!("store grew from {} to {} slots, next increment {}", old, new, self.grow);
    }

    /// Rebuilds lookup and free set after slots moved.
    fn reindex(&mut self) {
        self.lookup.clear();
        self.free.clear();
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(entity) => {
                    self.lookup.insert(entity.id(), index);
                }
                None => {
                    self.free.insert(index);
                }
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("capacity", &self.capacity())
            .field("size", &self.size)
            .field("grow", &self.grow)
            .field("last_id", &self.last_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("View{entities: [")?;
        for (i, entity) in self.iter(&[]).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{entity}")?;
        }
        f.write_str("]}")
    }
}

/// Borrowing iterator over live entities matching a filter.
pub struct Iter<'a> {
    slots: std::slice::Iter<'a, Option<Entity>>,
    filter: &'a [ComponentType],
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.slots
            .by_ref()
            .filter_map(Option::as_ref)
            .find(|entity| entity.contains(filter))
    }
}

/// Mutable borrowing iterator over live entities matching a filter.
pub struct IterMut<'a> {
    slots: std::slice::IterMut<'a, Option<Entity>>,
    filter: &'a [ComponentType],
}

impl<'a> Iterator for IterMut<'a> {
    type Item = &'a mut Entity;

    fn next(&mut self) -> Option<Self::Item> {
        let filter = self.filter;
        self.slots
            .by_ref()
            .filter_map(Option::as_mut)
            .find(|entity| entity.contains(filter))
    }
}

/// Detached forward cursor over a store.
///
/// Created by [`Store::cursor`]. Finite and not restartable: once it returns
/// `None` it keeps returning `None` unless new slots appear past its position.
#[derive(Clone, Debug)]
pub struct Cursor {
    next: usize,
    filter: Vec<ComponentType>,
}

impl Cursor {
    /// Advances to the next matching live entity and returns its id.
    pub fn next_id(&mut self, store: &Store) -> Option<EntityId> {
        while self.next < store.capacity() {
            let index = self.next;
            self.next += 1;
            if let Some(entity) = store.slot(index) {
                if entity.contains(&self.filter) {
                    return Some(entity.id());
                }
            }
        }
        None
    }
}
