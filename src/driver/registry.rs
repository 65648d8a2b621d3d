//! # Driver registry - concurrency-safe task-name to driver map.
//!
//! [`Drivers`] wraps the map of task name to [`DriverRef`] so the
//! controller loop, ad-hoc executions, and the status API can all read it
//! concurrently:
//!
//! ```text
//! Controller loop ──► snapshot() ──► one worker per inactive task
//! Ad-hoc caller  ──► set_active(name) ──► execute ──► set_inactive(name)
//! Status API     ──► snapshot() / len()           (read-only)
//! ```
//!
//! ## Rules
//! - The driver table and the template index share one readers-writer
//!   lock; the active set is an independent concurrent map so marking a
//!   task active never blocks readers of the driver table.
//! - The registry is populated once at init and fixed afterwards;
//!   `reset` exists for teardown only.
//! - A template id may be bound to at most one task: `add` rejects
//!   duplicate ids and leaves no partial bindings behind.
//! - `delete` purges the deleted task's template bindings so repeated
//!   add/delete cycles cannot leave stale index entries.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::driver::DriverRef;
use crate::error::RegistryError;

#[derive(Default)]
struct Inner {
    /// Map of task name to driver.
    drivers: HashMap<String, DriverRef>,
    /// Map of template id to owning task name.
    templates: HashMap<String, String>,
}

/// Concurrency-safe registry of task drivers.
#[derive(Default)]
pub struct Drivers {
    inner: RwLock<Inner>,
    /// Tasks with an execution currently in flight.
    active: DashMap<String, ()>,
}

impl Drivers {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a driver under the given task name.
    ///
    /// Binds every id in `driver.template_ids()` to the task. Fails with
    /// [`RegistryError::EmptyName`] for an empty name,
    /// [`RegistryError::AlreadyExists`] for a duplicate task, and
    /// [`RegistryError::TemplateAlreadyExists`] when another task already
    /// claims one of the template ids; in every failure case the registry
    /// is left untouched.
    pub async fn add(&self, name: &str, driver: DriverRef) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut inner = self.inner.write().await;
        if inner.drivers.contains_key(name) {
            return Err(RegistryError::AlreadyExists {
                name: name.to_string(),
            });
        }

        let ids = driver.template_ids();
        for id in &ids {
            if let Some(owner) = inner.templates.get(id) {
                return Err(RegistryError::TemplateAlreadyExists {
                    id: id.clone(),
                    owner: owner.clone(),
                });
            }
        }

        for id in ids {
            inner.templates.insert(id, name.to_string());
        }
        inner.drivers.insert(name.to_string(), driver);
        Ok(())
    }

    /// Retrieves the driver for a task.
    pub async fn get(&self, name: &str) -> Option<DriverRef> {
        let inner = self.inner.read().await;
        inner.drivers.get(name).cloned()
    }

    /// Reverse lookup: returns the task owning the given template id.
    pub async fn task_for_template(&self, template_id: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner.templates.get(template_id).cloned()
    }

    /// Returns the number of registered drivers.
    pub async fn len(&self) -> usize {
        self.inner.read().await.drivers.len()
    }

    /// Returns true if no drivers are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.drivers.is_empty()
    }

    /// Returns a shallow copy of the task-name to driver map.
    ///
    /// Suitable for iteration without holding the registry lock; the
    /// drivers inside are shared by reference.
    pub async fn snapshot(&self) -> HashMap<String, DriverRef> {
        let inner = self.inner.read().await;
        inner.drivers.clone()
    }

    /// Enables the buffer period on every registered driver.
    pub async fn set_buffer_period(&self) {
        let inner = self.inner.read().await;
        for driver in inner.drivers.values() {
            driver.set_buffer_period();
        }
    }

    /// Marks a task as having an execution in flight. Idempotent.
    pub fn set_active(&self, name: &str) {
        self.active.insert(name.to_string(), ());
    }

    /// Clears a task's in-flight marker.
    ///
    /// Returns true iff the task was marked active and is now cleared.
    pub fn set_inactive(&self, name: &str) -> bool {
        self.active.remove(name).is_some()
    }

    /// Returns whether a task currently has an execution in flight.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    /// Empties the driver table, the template index, and the active set.
    ///
    /// Teardown helper; the registry never shrinks during normal
    /// operation.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.drivers.clear();
        inner.templates.clear();
        self.active.clear();
    }

    /// Removes the driver registered under the given task name, if any,
    /// along with its template bindings.
    pub async fn delete(&self, name: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut inner = self.inner.write().await;
        inner.drivers.remove(name);
        inner.templates.retain(|_, owner| owner != name);
        Ok(())
    }
}
