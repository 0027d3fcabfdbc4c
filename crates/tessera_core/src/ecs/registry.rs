//! # Ordered Registrations
//!
//! Systems and signal subscriptions share one ordering discipline:
//! priority descending, then registration id ascending. Ids are monotonic per
//! registry, so the order is total and a record never compares equal to
//! another.

use std::cmp::Reverse;
use std::fmt;
use std::rc::Rc;

use crate::error::{EcsError, EcsResult};

/// Identifier handed out when a system or listener is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RegistrationId(u64);

impl RegistrationId {
    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered behavior with its priority and id.
pub(crate) struct Registration<T: ?Sized> {
    pub(crate) id: RegistrationId,
    pub(crate) priority: i32,
    /// Behavior name, captured at registration for diagnostics.
    pub(crate) name: &'static str,
    pub(crate) behavior: Rc<T>,
}

impl<T: ?Sized> Registration<T> {
    #[inline]
    fn key(&self) -> (Reverse<i32>, RegistrationId) {
        (Reverse(self.priority), self.id)
    }
}

impl<T: ?Sized> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            name: self.name,
            behavior: Rc::clone(&self.behavior),
        }
    }
}

/// Registrations kept sorted by `(priority desc, id asc)`.
pub(crate) struct Registry<T: ?Sized> {
    entries: Vec<Registration<T>>,
    last_id: u64,
}

impl<T: ?Sized> Registry<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            last_id: 0,
        }
    }

    /// Inserts a behavior at its ordered position and returns its id.
    pub(crate) fn insert(
        &mut self,
        behavior: Rc<T>,
        priority: i32,
        name: &'static str,
    ) -> RegistrationId {
        self.last_id += 1;
        let registration = Registration {
            id: RegistrationId(self.last_id),
            priority,
            name,
            behavior,
        };
        let key = registration.key();
        let at = self.entries.partition_point(|r| r.key() < key);
        self.entries.insert(at, registration);
        RegistrationId(self.last_id)
    }

    /// Removes a registration by id.
    pub(crate) fn remove(&mut self, id: RegistrationId) -> EcsResult<Registration<T>> {
        let at = self
            .entries
            .iter()
            .position(|r| r.id == id)
            .ok_or(EcsError::RegistrationNotFound(id))?;
        Ok(self.entries.remove(at))
    }

    /// Copies the current ordered registrations.
    ///
    /// A pass runs over a snapshot so behaviors may register or remove others
    /// without disturbing the pass in progress.
    pub(crate) fn snapshot(&self) -> Vec<Registration<T>> {
        self.entries.clone()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Registration<T>> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every registration. Ids keep counting from where they were.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
