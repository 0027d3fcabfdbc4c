//! # World
//!
//! The world owns the entity store, the system scheduler and the signal bus,
//! and drives them once per tick.

use std::cmp::Ordering;
use std::fmt;

use super::component::{Bundle, Component, ComponentType};
use super::entity::{Entity, EntityId};
use super::registry::RegistrationId;
use super::signal::{Listener, Subscriptions, DISPATCH};
use super::store::{Cursor, Iter, IterMut, Store};
use super::system::{System, Systems};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// Priority given to systems and listeners registered without one.
pub const DEFAULT_PRIORITY: i32 = 0;

/// The ECS world.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, ComponentType, EcsResult, World};
///
/// #[derive(Debug, Clone, Copy)]
/// struct Pos(f32);
/// impl Component for Pos {}
///
/// #[derive(Debug, Clone, Copy)]
/// struct Vel(f32);
/// impl Component for Vel {}
///
/// fn movement(world: &mut World, delta: f32) -> EcsResult<()> {
///     let filter = [ComponentType::of::<Pos>(), ComponentType::of::<Vel>()];
///     for entity in world.iter_mut(&filter) {
///         let vel = entity.get::<Vel>().map_or(0.0, |v| v.0);
///         if let Some(pos) = entity.get_mut::<Pos>() {
///             pos.0 += vel * delta;
///         }
///     }
///     Ok(())
/// }
///
/// let mut world = World::new();
/// world.add_system(movement);
/// let id = world.add_entity((Pos(0.0), Vel(2.0)));
///
/// world.update(0.5).unwrap();
/// assert_eq!(world.get(id).unwrap().get::<Pos>().map(|p| p.0), Some(1.0));
/// ```
pub struct World {
    pub(crate) store: Store,
    pub(crate) systems: Systems,
    pub(crate) subscriptions: Subscriptions,
}

impl World {
    /// Creates a world with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        let config = WorldConfig::default();
        Self::build(&config)
    }

    /// Creates a world sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig) if
    /// the configuration does not validate.
    pub fn with_config(config: &WorldConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &WorldConfig) -> Self {
        tracing::debug!(
            "creating world: {} entities, {} systems, {} listeners, {} signals",
            config.entity_capacity,
            config.system_capacity,
            config.listener_capacity,
            config.signal_capacity
        );
        Self {
            store: Store::new(config.entity_capacity),
            systems: Systems::new(config.system_capacity),
            subscriptions: Subscriptions::new(config.listener_capacity, config.signal_capacity),
        }
    }

    /// Returns the entity store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns the entity store mutably.
    #[inline]
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Returns the system scheduler.
    #[inline]
    #[must_use]
    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    /// Returns the system scheduler mutably.
    #[inline]
    pub fn systems_mut(&mut self) -> &mut Systems {
        &mut self.systems
    }

    /// Returns the signal bus.
    #[inline]
    #[must_use]
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Returns the signal bus mutably.
    #[inline]
    pub fn subscriptions_mut(&mut self) -> &mut Subscriptions {
        &mut self.subscriptions
    }

    // ----- entities -----

    /// Adds an entity with the given components. See [`Store::add_entity`].
    pub fn add_entity<B: Bundle>(&mut self, bundle: B) -> EntityId {
        self.store.add_entity(bundle)
    }

    /// Gets an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`](crate::EcsError::EntityNotFound)
    /// if the id is not live.
    pub fn get(&self, id: EntityId) -> EcsResult<&Entity> {
        self.store.get(id)
    }

    /// Gets an entity by id, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`](crate::EcsError::EntityNotFound)
    /// if the id is not live.
    pub fn get_mut(&mut self, id: EntityId) -> EcsResult<&mut Entity> {
        self.store.get_mut(id)
    }

    /// Removes an entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`](crate::EcsError::EntityNotFound)
    /// if the id is not live.
    pub fn remove(&mut self, id: EntityId) -> EcsResult<()> {
        self.store.remove(id)
    }

    /// Removes the component of type `C` from an entity and returns it.
    /// Removing the last component removes the entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityNotFound`](crate::EcsError::EntityNotFound)
    /// if the id is not live.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> EcsResult<Option<C>> {
        self.store.remove_component::<C>(id)
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.store.size()
    }

    /// Iterates over live entities holding every one of `types`.
    pub fn iter<'a>(&'a self, types: &'a [ComponentType]) -> Iter<'a> {
        self.store.iter(types)
    }

    /// Mutable counterpart of [`World::iter`].
    pub fn iter_mut<'a>(&'a mut self, types: &'a [ComponentType]) -> IterMut<'a> {
        self.store.iter_mut(types)
    }

    /// Creates a detached cursor. See [`Store::cursor`].
    #[must_use]
    pub fn cursor(&self, types: &[ComponentType]) -> Cursor {
        self.store.cursor(types)
    }

    /// Sorts live entities with a `less` predicate.
    pub fn sort<F>(&mut self, less: F)
    where
        F: FnMut(&Entity, &Entity) -> bool,
    {
        self.store.sort(less);
    }

    /// Sorts live entities by `compare`.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Entity, &Entity) -> Ordering,
    {
        self.store.sort_by(compare);
    }

    // ----- systems -----

    /// Registers a system with the default priority.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> RegistrationId {
        self.systems.register(system, DEFAULT_PRIORITY)
    }

    /// Registers a system. Higher priorities run first.
    pub fn add_system_with_priority<S: System + 'static>(&mut self, system: S, priority: i32) -> RegistrationId {
        self.systems.register(system, priority)
    }

    /// Removes a system.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`EcsError::RegistrationNotFound`](crate::EcsError::RegistrationNotFound)
    /// if the id is not registered.
    pub fn remove_system(&mut self, id: RegistrationId) -> EcsResult<()> {
        self.systems.remove(id)
    }

    // ----- signals -----

    /// Subscribes a listener with the default priority.
    pub fn add_listener<L: Listener + 'static>(&mut self, listener: L, signals: &[ComponentType]) -> RegistrationId {
        self.subscriptions.subscribe(listener, DEFAULT_PRIORITY, signals)
    }

    /// Subscribes a listener. Higher priorities hear each signal first.
    pub fn add_listener_with_priority<L: Listener + 'static>(
        &mut self,
        listener: L,
        priority: i32,
        signals: &[ComponentType],
    ) -> RegistrationId {
        self.subscriptions.subscribe(listener, priority, signals)
    }

    /// Removes a listener.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`EcsError::RegistrationNotFound`](crate::EcsError::RegistrationNotFound)
    /// if the id is not registered.
    pub fn remove_listener(&mut self, id: RegistrationId) -> EcsResult<()> {
        self.subscriptions.unsubscribe(id)
    }

    /// Queues a signal for delivery after the systems of the next update.
    pub fn signal<S: Component>(&mut self, signal: S) {
        self.subscriptions.signal(signal);
    }

    // ----- tick -----

    /// Runs one tick: every system, then every queued signal.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a system or listener. A failing
    /// system skips signal delivery for this tick; queued signals wait for
    /// the next one. Called from a listener, returns [`EcsError::Reentrant`]
    /// before any system runs.
    pub fn update(&mut self, delta: f32) -> EcsResult<()> {
        if self.subscriptions.is_dispatching() {
            return Err(EcsError::Reentrant { name: DISPATCH });
        }
        Systems::update(self, delta)?;
        Subscriptions::update(self, delta)
    }

    /// Removes every entity, system, listener and queued signal.
    pub fn clear(&mut self) {
        self.store.clear();
        self.systems.clear();
        self.subscriptions.clear();
        tracing::debug!("world cleared");
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("store", &self.store)
            .field("systems", &self.systems)
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "World{{view: {}, systems: [{}], listeners: [", self.store, self.systems)?;
        self.subscriptions.fmt_listeners(f)?;
        write!(f, "], pending: {}}}", self.subscriptions.pending())
    }
}
