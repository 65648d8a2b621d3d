//! # Bounded in-memory store of task outcome events.
//!
//! [`Store`] keeps, per task, the most recent [`DEFAULT_EVENT_CAPACITY`]
//! finalized events; older records are evicted oldest-first. Events are
//! not persisted across restarts.
//!
//! ## Rules
//! - Events for one task are appended in finalization order, so reads are
//!   totally ordered by start time.
//! - [`Store::read`] returns a copy, **newest event first** (the order the
//!   status API presents history in).
//! - One mutex guards the whole store: events are rare, contention is not
//!   a concern.
//!
//! ## Example
//! ```
//! use driftsync::{Event, Store};
//!
//! let store = Store::new();
//! let mut ev = Event::new("web", Vec::new(), Vec::new(), "module").unwrap();
//! ev.finish(None);
//! store.add(ev).unwrap();
//!
//! let history = store.read("web");
//! assert_eq!(history.len(), 1);
//! assert!(history[0].success);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::events::Event;

/// Default number of events retained per task.
pub const DEFAULT_EVENT_CAPACITY: usize = 5;

/// Bounded per-task history of finalized events.
pub struct Store {
    capacity: usize,
    events: Mutex<HashMap<String, VecDeque<Event>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates a store retaining [`DEFAULT_EVENT_CAPACITY`] events per
    /// task.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a store with an explicit per-task capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a finalized event to its task's history, evicting the
    /// oldest record when the history is full.
    ///
    /// Fails with [`StoreError::MissingTaskName`] for events that cannot
    /// be attributed to a task.
    pub fn add(&self, event: Event) -> Result<(), StoreError> {
        if event.task_name.is_empty() {
            return Err(StoreError::MissingTaskName);
        }

        let mut events = self.events.lock().expect("event store lock poisoned");
        let history = events.entry(event.task_name.clone()).or_default();
        history.push_back(event);
        while history.len() > self.capacity {
            history.pop_front();
        }
        Ok(())
    }

    /// Returns a copy of a task's history, newest event first.
    pub fn read(&self, task_name: &str) -> Vec<Event> {
        let events = self.events.lock().expect("event store lock poisoned");
        events
            .get(task_name)
            .map(|history| history.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns a copy of every task's history, newest event first.
    pub fn read_all(&self) -> HashMap<String, Vec<Event>> {
        let events = self.events.lock().expect("event store lock poisoned");
        events
            .iter()
            .map(|(name, history)| (name.clone(), history.iter().rev().cloned().collect()))
            .collect()
    }

    /// Removes all events recorded for a task.
    pub fn delete(&self, task_name: &str) {
        let mut events = self.events.lock().expect("event store lock poisoned");
        events.remove(task_name);
    }
}
