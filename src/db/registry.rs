// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the driver [`Registry`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;
use log::{debug, info};
use slab::Slab;

use super::driver::{Driver, DynDriver};
use super::Error;

/// The number of drivers a [`Registry::new`] registry accepts.
pub const DEFAULT_CAPACITY: usize = 10;

lazy_static! {
    static ref GLOBAL: Registry = Registry::new();
}

/// A table of named [`Driver`]s.
///
/// Databases find their driver by name in a registry when they are
/// created. A process-wide registry is available through
/// [`Registry::global`] (and the [`register`](super::register) and
/// [`unregister`](super::unregister) shortcuts), but registries can
/// also be created separately and passed to
/// [`Database::create_with`](super::Database::create_with).
///
/// A registry holds a bounded number of drivers. Slots freed by
/// [`Registry::unregister`] are reused. Unregistering a driver does
/// not affect databases already created with it; they keep their own
/// handle to the driver until they are destroyed.
pub struct Registry {
    capacity: usize,
    slots: Mutex<Slab<Registration>>,
}

struct Registration {
    name: String,
    driver: Arc<dyn DynDriver>,
}

impl Registry {
    /// Creates an empty registry holding at most
    /// [`DEFAULT_CAPACITY`] drivers.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty registry holding at most `capacity` drivers.
    /// Slots are allocated as drivers are registered, so `capacity` is
    /// only a bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Mutex::new(Slab::with_capacity(capacity.min(DEFAULT_CAPACITY))),
        }
    }

    /// Returns the process-wide registry, which is initialized on first
    /// use.
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers `driver` under `name`.
    ///
    /// Fails with [`Error::AlreadyExists`] if a driver is already
    /// registered under `name`, and with [`Error::NoCapacity`] if the
    /// registry is full. Panics if `name` is empty.
    pub fn register<D: Driver>(&self, name: &str, driver: D) -> Result<(), Error> {
        assert!(!name.is_empty(), "driver names must not be empty");
        let mut slots = self.lock();
        if slots.iter().any(|(_, r)| r.name == name) {
            return Err(Error::AlreadyExists);
        } else if slots.len() >= self.capacity {
            return Err(Error::NoCapacity);
        }
        let slot = slots.insert(Registration {
            name: name.to_owned(),
            driver: Arc::new(driver),
        });
        info!("Registered simple database driver {} in slot {}.", name, slot);
        Ok(())
    }

    /// Unregisters the driver registered under `name`. This is a no-op
    /// if there is no such driver.
    pub fn unregister(&self, name: &str) {
        let mut slots = self.lock();
        let found = slots
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(slot, _)| slot);
        if let Some(slot) = found {
            slots.remove(slot);
            info!("Unregistered simple database driver {}.", name);
        }
    }

    /// Returns whether a driver is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|(_, r)| r.name == name)
    }

    /// Returns the number of registered drivers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no drivers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of drivers this registry holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Unregisters every driver.
    pub fn clear(&self) {
        let mut slots = self.lock();
        debug!("Clearing {} simple database driver(s).", slots.len());
        slots.clear();
    }

    /// Returns a handle to the driver registered under `name`. The lock
    /// is not held after this returns, so the driver may be used while
    /// the registry changes.
    pub(super) fn get(&self, name: &str) -> Option<Arc<dyn DynDriver>> {
        self.lock()
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(_, r)| r.driver.clone())
    }

    /// Locks the slot table. Every critical section is a single slab
    /// operation, so a panic elsewhere cannot leave the table in a torn
    /// state, and a poisoned lock is simply taken over.
    fn lock(&self) -> MutexGuard<Slab<Registration>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let slots = self.lock();
        f.debug_struct("Registry")
            .field("capacity", &self.capacity)
            .field(
                "drivers",
                &slots.iter().map(|(_, r)| r.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers `driver` under `name` in the process-wide registry. See
/// [`Registry::register`].
pub fn register<D: Driver>(name: &str, driver: D) -> Result<(), Error> {
    Registry::global().register(name, driver)
}

/// Unregisters the driver registered under `name` in the process-wide
/// registry. See [`Registry::unregister`].
pub fn unregister(name: &str) {
    Registry::global().unregister(name)
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
