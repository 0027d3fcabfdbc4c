//! # Entity Component System
//!
//! Dynamic, single-threaded ECS.
//!
//! ## Design Philosophy
//!
//! - Entities carry any set of components, added and removed at runtime
//! - Slots of removed entities are reused; entity ids never are
//! - Systems and listeners run in a deterministic order: priority, then
//!   registration order
//! - Signals are delivered one pass after they are raised

mod component;
mod entity;
mod registry;
mod signal;
mod store;
mod system;
mod world;

pub use component::{AsAny, BoxedComponent, Bundle, Component, ComponentType};
pub use entity::{Entity, EntityId};
pub use registry::RegistrationId;
pub use signal::{Listener, Subscriptions, DISPATCH};
pub use store::{Cursor, Iter, IterMut, Store};
pub use system::{System, Systems};
pub use world::{World, DEFAULT_PRIORITY};
