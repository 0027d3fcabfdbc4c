//! # Systems
//!
//! A system is behavior run once per tick against the world. Systems run
//! one after another in a fixed order: higher priority first, registration
//! order among equal priorities.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::component::short_name;
use super::registry::{RegistrationId, Registry};
use super::world::World;
use crate::error::{EcsError, EcsResult};

/// Behavior invoked once per tick by [`World::update`].
///
/// Implemented for every `FnMut(&mut World, f32) -> EcsResult<()>`, so plain
/// functions and closures can be registered directly.
///
/// # Example
///
/// ```rust
/// use tessera_core::{EcsResult, System, World};
///
/// struct Counter(u32);
///
/// impl System for Counter {
///     fn run(&mut self, _world: &mut World, _delta: f32) -> EcsResult<()> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// let mut world = World::new();
/// world.add_system(Counter(0));
/// world.update(0.016).unwrap();
/// ```
pub trait System {
    /// Runs the system for one tick.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining systems of this tick and is returned
    /// from [`World::update`] unchanged.
    fn run(&mut self, world: &mut World, delta: f32) -> EcsResult<()>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        short_name(std::any::type_name::<Self>())
    }
}

impl<F> System for F
where
    F: FnMut(&mut World, f32) -> EcsResult<()>,
{
    fn run(&mut self, world: &mut World, delta: f32) -> EcsResult<()> {
        self(world, delta)
    }
}

/// The scheduler: ordered registrations of systems.
pub struct Systems {
    registry: Registry<RefCell<dyn System>>,
}

impl Systems {
    /// Creates an empty scheduler with room for `capacity` systems.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            registry: Registry::with_capacity(capacity),
        }
    }

    /// Registers a system with a priority and returns its registration id.
    pub fn register<S>(&mut self, system: S, priority: i32) -> RegistrationId
    where
        S: System + 'static,
    {
        let name = system.name();
        let id = self
            .registry
            .insert(Rc::new(RefCell::new(system)), priority, name);
        tracing::debug!("registered system {} as {} with priority {}", name, id, priority);
        id
    }

    /// Removes a system.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::RegistrationNotFound`] if the id is not registered.
    pub fn remove(&mut self, id: RegistrationId) -> EcsResult<()> {
        let removed = self.registry.remove(id)?;
        tracing::debug!("removed system {} ({})", removed.name, id);
        Ok(())
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Checks whether no system is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Removes every system.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Runs every system registered in `world`, in order.
    ///
    /// The order is fixed when the pass starts: systems registered or removed
    /// by a running system take effect on the next pass.
    ///
    /// # Errors
    ///
    /// Stops at the first failing system and returns its error. Systems that
    /// already ran keep their effects. Returns [`EcsError::Reentrant`] if a
    /// system is reached while it is already running.
    pub fn update(world: &mut World, delta: f32) -> EcsResult<()> {
        let pass = world.systems.registry.snapshot();

        for registration in pass {
            let mut system = registration
                .behavior
                .try_borrow_mut()
                .map_err(|_| EcsError::Reentrant {
                    name: registration.name,
                })?;

            if let Err(err) = system.run(world, delta) {
                tracing::warn!(
                    "system {} ({}) failed: {}",
                    registration.name,
                    registration.id,
                    err
                );
                return Err(err);
            }
        }

        Ok(())
    }
}

impl Default for Systems {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for Systems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Systems")
            .field("len", &self.registry.len())
            .finish()
    }
}

impl fmt::Display for Systems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, registration) in self.registry.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(registration.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Calls = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(calls: &Calls, label: &'static str) -> impl FnMut(&mut World, f32) -> EcsResult<()> {
        let calls = Rc::clone(calls);
        move |_: &mut World, _: f32| -> EcsResult<()> {
            calls.borrow_mut().push(label);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_priority_order() {
        let calls = Calls::default();
        let mut world = World::new();
        world.add_system_with_priority(recorder(&calls, "a"), 0);
        world.add_system_with_priority(recorder(&calls, "b"), 100);
        world.add_system_with_priority(recorder(&calls, "c"), 0);

        world.update(0.0).unwrap();
        assert_eq!(*calls.borrow(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_fail_fast() {
        let calls = Calls::default();
        let mut world = World::new();
        world.add_system(recorder(&calls, "first"));
        world.add_system(|_: &mut World, _: f32| -> EcsResult<()> { Err(EcsError::behavior(Boom)) });
        world.add_system(recorder(&calls, "never"));

        let err = world.update(0.0).unwrap_err();
        assert!(err.is::<Boom>());
        assert_eq!(*calls.borrow(), vec!["first"]);
    }

    #[test]
    fn test_remove() {
        let calls = Calls::default();
        let mut world = World::new();
        let a = world.add_system(recorder(&calls, "a"));
        world.add_system(recorder(&calls, "b"));

        world.remove_system(a).unwrap();
        assert!(matches!(
            world.remove_system(a),
            Err(EcsError::RegistrationNotFound(id)) if id == a
        ));

        world.update(0.0).unwrap();
        assert_eq!(*calls.borrow(), vec!["b"]);
    }

    #[test]
    fn test_registration_during_pass_runs_next_pass() {
        let calls = Calls::default();
        let mut world = World::new();
        let late = Rc::new(RefCell::new(Some(recorder(&calls, "late"))));
        let late_slot = Rc::clone(&late);
        world.add_system(move |world: &mut World, _: f32| -> EcsResult<()> {
            if let Some(system) = late_slot.borrow_mut().take() {
                world.add_system(system);
            }
            Ok(())
        });

        world.update(0.0).unwrap();
        assert!(calls.borrow().is_empty());

        world.update(0.0).unwrap();
        assert_eq!(*calls.borrow(), vec!["late"]);
    }

    #[test]
    fn test_reentrant_update_is_rejected() {
        let mut world = World::new();
        world.add_system(|world: &mut World, delta: f32| world.update(delta));

        let err = world.update(0.0).unwrap_err();
        assert!(matches!(err, EcsError::Reentrant { .. }));
    }

    fn named_system(_: &mut World, _: f32) -> EcsResult<()> {
        Ok(())
    }

    #[test]
    fn test_display_names() {
        let mut systems = Systems::new(2);
        systems.register(named_system, 0);
        assert_eq!(systems.to_string(), "named_system");
        assert_eq!(systems.len(), 1);

        systems.clear();
        assert!(systems.is_empty());
    }
}
