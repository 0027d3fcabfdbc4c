//! # Core Error Types
//!
//! All errors that can surface from the store, the scheduler, the signal bus
//! and the world.

use std::error::Error as StdError;

use thiserror::Error;

use crate::ecs::{EntityId, RegistrationId};

/// Boxed error produced by user code running inside a system or listener.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug)]
pub enum EcsError {
    /// The entity id was never issued or has been removed.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The system or subscription is not registered (or already removed).
    #[error("registration not found: {0}")]
    RegistrationNotFound(RegistrationId),

    /// A system or listener was invoked while it was already running.
    #[error("behavior {name} invoked while already running")]
    Reentrant {
        /// Name of the behavior.
        name: &'static str,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error returned by a user system or listener.
    #[error("{0}")]
    Behavior(#[source] BoxError),
}

impl EcsError {
    /// Wraps a user error so it can be returned from a system or listener.
    ///
    /// The original error stays reachable through [`EcsError::downcast_ref`].
    pub fn behavior<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Behavior(error.into())
    }

    /// Returns the user error as `E` if this is a [`EcsError::Behavior`]
    /// carrying a value of that type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::Behavior(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Checks whether this error carries a user error of type `E`.
    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
