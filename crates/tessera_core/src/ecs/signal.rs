//! # Signal Bus
//!
//! Signals are components sent to listeners rather than attached to
//! entities. Delivery is deferred: a signal raised during a tick is handed to
//! listeners by [`World::update`] after every system has run.
//!
//! ## Double buffering
//!
//! ```text
//!   signal() ──► incoming ──(start of pass)──► to_send ──► listeners
//!                   ▲                                          │
//!                   └──────── signal() from a listener ────────┘
//!                             (delivered next pass)
//! ```
//!
//! A dispatch pass freezes both the listener set and the batch of signals
//! when it starts. Signals raised while the pass runs wait for the next one.
//!
//! When a listener fails, the rest of the frozen batch is dropped and the
//! error is returned. Nothing from that batch is delivered again.
//!
//! Passes do not nest. An update requested while a pass is delivering fails
//! with [`EcsError::Reentrant`] and leaves both queues alone.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::component::{short_name, Component, ComponentType};
use super::registry::{RegistrationId, Registry};
use super::world::World;
use crate::error::{EcsError, EcsResult};

/// Name reported by [`EcsError::Reentrant`] for a nested dispatch pass.
pub const DISPATCH: &str = "signal dispatch";

/// Handler invoked once for every delivered signal it subscribed to.
///
/// Implemented for every `FnMut(&mut World, &dyn Component, f32) -> EcsResult<()>`.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, ComponentType, EcsResult, World};
///
/// #[derive(Debug)]
/// struct Hit(u32);
/// impl Component for Hit {}
///
/// let mut world = World::new();
/// world.add_listener(
///     |_: &mut World, signal: &dyn Component, _: f32| -> EcsResult<()> {
///         assert_eq!(signal.downcast_ref::<Hit>().map(|h| h.0), Some(3));
///         Ok(())
///     },
///     &[ComponentType::of::<Hit>()],
/// );
/// world.signal(Hit(3));
/// world.update(0.016).unwrap();
/// ```
pub trait Listener {
    /// Handles one signal.
    ///
    /// # Errors
    ///
    /// Any error stops the dispatch pass and is returned from
    /// [`World::update`] unchanged.
    fn on_signal(&mut self, world: &mut World, signal: &dyn Component, delta: f32) -> EcsResult<()>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        short_name(std::any::type_name::<Self>())
    }
}

impl<F> Listener for F
where
    F: FnMut(&mut World, &dyn Component, f32) -> EcsResult<()>,
{
    fn on_signal(&mut self, world: &mut World, signal: &dyn Component, delta: f32) -> EcsResult<()> {
        self(world, signal, delta)
    }
}

/// A listener and the signal types it receives.
struct Subscription<L: ?Sized> {
    signals: Vec<ComponentType>,
    listener: RefCell<L>,
}

impl<L: ?Sized> Subscription<L> {
    #[inline]
    fn accepts(&self, signal_type: ComponentType) -> bool {
        self.signals.contains(&signal_type)
    }
}

/// A queued signal with its type tag.
struct PendingSignal {
    signal_type: ComponentType,
    payload: Box<dyn Component>,
}

/// The signal bus: ordered listener subscriptions plus the signal queues.
pub struct Subscriptions {
    registry: Registry<Subscription<dyn Listener>>,
    /// Signals raised since the last pass started.
    incoming: Vec<PendingSignal>,
    /// Batch being delivered by the current pass.
    to_send: VecDeque<PendingSignal>,
    /// Set while a pass is delivering.
    dispatching: bool,
}

impl Subscriptions {
    /// Creates an empty bus sized for `listener_capacity` listeners and
    /// `signal_capacity` queued signals.
    #[must_use]
    pub fn new(listener_capacity: usize, signal_capacity: usize) -> Self {
        Self {
            registry: Registry::with_capacity(listener_capacity),
            incoming: Vec::with_capacity(signal_capacity),
            to_send: VecDeque::with_capacity(signal_capacity),
            dispatching: false,
        }
    }

    /// Subscribes a listener to the given signal types.
    ///
    /// A listener subscribed to no types never fires.
    pub fn subscribe<L>(&mut self, listener: L, priority: i32, signals: &[ComponentType]) -> RegistrationId
    where
        L: Listener + 'static,
    {
        let name = listener.name();
        let subscription = Subscription {
            signals: signals.to_vec(),
            listener: RefCell::new(listener),
        };
        let id = self.registry.insert(Rc::new(subscription), priority, name);
        tracing::debug!(
            "subscribed listener {} as {} with priority {} to {} signal types",
            name,
            id,
            priority,
            signals.len()
        );
        id
    }

    /// Removes a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::RegistrationNotFound`] if the id is not registered.
    pub fn unsubscribe(&mut self, id: RegistrationId) -> EcsResult<()> {
        let removed = self.registry.remove(id)?;
        tracing::debug!("unsubscribed listener {} ({})", removed.name, id);
        Ok(())
    }

    /// Queues a signal for delivery on the next dispatch pass.
    pub fn signal<S: Component>(&mut self, signal: S) {
        let signal_type = ComponentType::of::<S>();
        tracing::trace!("queued signal {}", signal_type);
        self.incoming.push(PendingSignal {
            signal_type,
            payload: Box::new(signal),
        });
    }

    /// Returns the number of signals waiting for the next pass.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    /// Checks whether a dispatch pass is running.
    #[must_use]
    pub fn is_dispatching(&self) -> bool {
        self.dispatching
    }

    /// Returns the number of subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Checks whether no listener is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Drops every subscription and every queued signal.
    ///
    /// Called from a listener, this also stops the rest of the current batch.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.incoming.clear();
        self.to_send.clear();
    }

    /// Delivers every signal queued in `world` to its listeners.
    ///
    /// Signals go out in the order they were raised; each reaches matching
    /// listeners by priority, then subscription order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing listener and returns its error. The rest of
    /// the batch is discarded. Returns [`EcsError::Reentrant`] without
    /// touching the queues if a pass is already running, and through the
    /// discard path if a listener is reached while it is already running.
    pub fn update(world: &mut World, delta: f32) -> EcsResult<()> {
        if world.subscriptions.dispatching {
            return Err(EcsError::Reentrant { name: DISPATCH });
        }
        world.subscriptions.dispatching = true;
        let result = Self::dispatch(world, delta);
        world.subscriptions.dispatching = false;
        result
    }

    fn dispatch(world: &mut World, delta: f32) -> EcsResult<()> {
        let bus = &mut world.subscriptions;
        if bus.incoming.is_empty() {
            return Ok(());
        }
        bus.to_send.extend(bus.incoming.drain(..));
        let batch = bus.to_send.len();
        let listeners = bus.registry.snapshot();

        while let Some(pending) = world.subscriptions.to_send.pop_front() {
            for registration in &listeners {
                let subscription = &registration.behavior;
                if !subscription.accepts(pending.signal_type) {
                    continue;
                }

                let delivered = subscription
                    .listener
                    .try_borrow_mut()
                    .map_err(|_| EcsError::Reentrant {
                        name: registration.name,
                    })
                    .and_then(|mut listener| listener.on_signal(world, pending.payload.as_ref(), delta));

                if let Err(err) = delivered {
                    let dropped = world.subscriptions.to_send.len();
                    world.subscriptions.to_send.clear();
                    tracing::warn!(
                        "listener {} ({}) failed on {}, dropped {} undelivered signals: {}",
                        registration.name,
                        registration.id,
                        pending.signal_type,
                        dropped,
                        err
                    );
                    return Err(err);
                }
            }
        }

        tracing::debug!("delivered {} signals to {} listeners", batch, listeners.len());
        Ok(())
    }
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CAPACITY, crate::config::DEFAULT_CAPACITY)
    }
}

impl fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriptions")
            .field("len", &self.registry.len())
            .field("pending", &self.incoming.len())
            .finish()
    }
}

impl Subscriptions {
    /// Writes the subscription list without the pending count.
    pub(crate) fn fmt_listeners(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, registration) in self.registry.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{{listener: {}, signals: {{", registration.name)?;
            for (j, signal_type) in registration.behavior.signals.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{signal_type}")?;
            }
            f.write_str("}}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Subscriptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_listeners(f)?;
        write!(f, " pending: {}", self.incoming.len())
    }
}
