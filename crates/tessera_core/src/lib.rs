//! # TESSERA Core
//!
//! Entity Component System with a deferred signal bus:
//! - Entities with any set of components, filtered iteration and sorting
//! - Systems run once per tick in priority order
//! - Signals delivered to typed listeners one pass after they are raised
//!
//! ## Tick
//!
//! 1. Every system runs, highest priority first, ties in registration order
//! 2. Every signal queued before the pass is delivered to its listeners
//! 3. The first error stops the tick and is returned unchanged
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Component, ComponentType, EcsResult, World};
//!
//! #[derive(Debug)]
//! struct Spawned;
//! impl Component for Spawned {}
//!
//! let mut world = World::new();
//! world.add_system(|world: &mut World, _: f32| -> EcsResult<()> {
//!     world.signal(Spawned);
//!     Ok(())
//! });
//! world.add_listener(
//!     |world: &mut World, _: &dyn Component, _: f32| -> EcsResult<()> {
//!         world.add_entity((Spawned,));
//!         Ok(())
//!     },
//!     &[ComponentType::of::<Spawned>()],
//! );
//! world.update(0.016).unwrap();
//! assert_eq!(world.size(), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::{WorldConfig, DEFAULT_CAPACITY};
pub use ecs::{
    Bundle, Component, ComponentType, Cursor, Entity, EntityId, Listener, RegistrationId, Store,
    Subscriptions, System, Systems, World, DEFAULT_PRIORITY, DISPATCH,
};
pub use error::{BoxError, EcsError, EcsResult};
