//! # Error types used by the sync runtime and its drivers.
//!
//! Each subsystem owns a small `thiserror` enum:
//!
//! - [`RegistryError`] faults from the driver registry (bad names, duplicates).
//! - [`StoreError`] faults from the event store (malformed events).
//! - [`DriverError`] failures raised by a driver while rendering or applying.
//! - [`WatchError`] failures signalled by the dependency watcher.
//! - [`CtrlError`] the controller-level umbrella returned by `once`/`run`.
//!
//! All types provide `as_label` helpers producing short stable snake_case
//! labels for logs and metrics.

use thiserror::Error;

/// # Errors produced by the driver registry.
///
/// The registry is populated once at init time, so these mostly surface
/// configuration mistakes: empty task names, duplicate registrations, or
/// two drivers claiming the same template.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A task name was empty where a non-empty name is required.
    #[error("task name cannot be empty")]
    EmptyName,

    /// Attempted to register a driver under a name that is already taken.
    #[error("a driver already exists for task '{name}'")]
    AlreadyExists {
        /// The duplicate task name.
        name: String,
    },

    /// Attempted to register a driver claiming a template id that is
    /// already bound to another task.
    #[error("template '{id}' is already bound to task '{owner}'")]
    TemplateAlreadyExists {
        /// The duplicate template id.
        id: String,
        /// The task currently owning the template.
        owner: String,
    },

    /// Lookup for a task that was never registered.
    #[error("no driver registered for task '{name}'")]
    NotFound {
        /// The missing task name.
        name: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::EmptyName => "registry_empty_name",
            RegistryError::AlreadyExists { .. } => "registry_already_exists",
            RegistryError::TemplateAlreadyExists { .. } => "registry_template_already_exists",
            RegistryError::NotFound { .. } => "registry_not_found",
        }
    }
}

/// # Errors produced by the event store.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    /// The event carries no task name and cannot be attributed.
    #[error("event is missing a task name")]
    MissingTaskName,
}

impl StoreError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreError::MissingTaskName => "store_missing_task_name",
        }
    }
}

/// # Failures raised by a driver.
///
/// Drivers are external: a render failure usually means missing catalog
/// data or a broken template, an apply failure means the infrastructure
/// tool rejected or could not realize the plan. `Canceled` signals that the
/// driver observed cancellation mid-operation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DriverError {
    /// The driver failed to render its template.
    #[error("unable to render template: {reason}")]
    Render { reason: String },

    /// The driver failed to apply the rendered plan.
    #[error("unable to apply changes: {reason}")]
    Apply { reason: String },

    /// The driver observed cancellation and aborted the operation.
    #[error("driver operation canceled")]
    Canceled,
}

impl DriverError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            DriverError::Render { .. } => "driver_render_failed",
            DriverError::Apply { .. } => "driver_apply_failed",
            DriverError::Canceled => "driver_canceled",
        }
    }

    /// Indicates whether the failure was a cooperative cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, DriverError::Canceled)
    }
}

/// # Failures signalled by the dependency watcher.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchError {
    /// The watcher hit a fatal error and cannot continue monitoring.
    #[error("error watching dependencies: {reason}")]
    Failed { reason: String },

    /// The watcher's update source closed and no further changes will be
    /// observed.
    #[error("dependency watcher closed")]
    Closed,
}

impl WatchError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::Failed { .. } => "watch_failed",
            WatchError::Closed => "watch_closed",
        }
    }
}

/// # Errors returned by the controller entry points.
///
/// `once` fails fast with the first per-task error; `run` only ever returns
/// [`CtrlError::Watch`] or [`CtrlError::Canceled`], everything else is
/// logged per tick and retried on the next dependency change.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CtrlError {
    /// A driver failed while rendering a task's template.
    #[error("error rendering template for task '{task}': {source}")]
    Render {
        task: String,
        #[source]
        source: DriverError,
    },

    /// A driver failed while applying a task's plan.
    #[error("could not apply changes for task '{task}': {source}")]
    Apply {
        task: String,
        #[source]
        source: DriverError,
    },

    /// The retry policy gave up applying a task.
    #[error("could not apply changes for task '{task}', gave up after {attempts} attempts: {source}")]
    RetryExhausted {
        task: String,
        attempts: u32,
        #[source]
        source: DriverError,
    },

    /// An execution was requested for a task that already has one in flight.
    #[error("task '{name}' is already being executed")]
    TaskActive { name: String },

    /// The dependency watcher failed; the controller cannot make progress.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The root context was canceled.
    #[error("controller canceled")]
    Canceled,

    /// A registry fault, surfaced during init or ad-hoc execution.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An event store fault, surfaced while recording an outcome.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CtrlError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            CtrlError::Render { .. } => "ctrl_render_failed",
            CtrlError::Apply { .. } => "ctrl_apply_failed",
            CtrlError::RetryExhausted { .. } => "ctrl_retry_exhausted",
            CtrlError::TaskActive { .. } => "ctrl_task_active",
            CtrlError::Watch(_) => "ctrl_watch_failed",
            CtrlError::Canceled => "ctrl_canceled",
            CtrlError::Registry(e) => e.as_label(),
            CtrlError::Store(e) => e.as_label(),
        }
    }
}
