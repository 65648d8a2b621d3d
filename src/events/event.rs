//! # Outcome record for one task execution cycle.
//!
//! An [`Event`] is created when the execution unit starts a cycle and
//! finalized exactly once when the cycle ends, successfully or not. After
//! [`Event::finish`] the record is immutable; the store only ever receives
//! finalized events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;

/// Outcome record for one full execution cycle of a task.
#[derive(Clone, Debug, Serialize)]
pub struct Event {
    /// Name of the task that ran.
    pub task_name: String,
    /// Provider names the task was configured with.
    pub providers: Vec<String>,
    /// Catalog services the task monitors.
    pub services: Vec<String>,
    /// Source module the task's template came from.
    pub source: String,
    /// When the cycle started.
    pub start_time: DateTime<Utc>,
    /// When the cycle ended; `None` until finalized.
    pub end_time: Option<DateTime<Utc>>,
    /// Whether the cycle ended without error.
    pub success: bool,
    /// Error description when the cycle failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Event {
    /// Creates an event for the named task and stamps its start time.
    ///
    /// Fails with [`StoreError::MissingTaskName`] when `task_name` is
    /// empty, since such an event could never be attributed.
    pub fn new(
        task_name: impl Into<String>,
        providers: Vec<String>,
        services: Vec<String>,
        source: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let task_name = task_name.into();
        if task_name.is_empty() {
            return Err(StoreError::MissingTaskName);
        }

        Ok(Self {
            task_name,
            providers,
            services,
            source: source.into(),
            start_time: Utc::now(),
            end_time: None,
            success: false,
            error: None,
        })
    }

    /// Finalizes the event with the cycle's outcome and stamps its end
    /// time. The record must not be modified afterwards.
    pub fn finish(&mut self, error: Option<String>) {
        self.end_time = Some(Utc::now());
        self.success = error.is_none();
        self.error = error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_empty_task_name() {
        let err = Event::new("", Vec::new(), Vec::new(), "module").unwrap_err();
        assert!(matches!(err, StoreError::MissingTaskName));
    }

    #[test]
    fn finish_stamps_outcome() {
        let mut ev = Event::new("web", Vec::new(), Vec::new(), "module").unwrap();
        assert!(ev.end_time.is_none());
        assert!(!ev.success);

        ev.finish(None);
        assert!(ev.end_time.is_some());
        assert!(ev.success);

        let mut failed = Event::new("web", Vec::new(), Vec::new(), "module").unwrap();
        failed.finish(Some("boom".to_string()));
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }
}
