//! # Driver abstraction for task execution.
//!
//! A [`Driver`] encapsulates the external infrastructure tool for one task:
//! it owns the task's template(s) and any per-task state, and exposes the
//! render/apply cycle the controller drives.
//!
//! - **[`Driver`]** - trait implemented per infrastructure tool (the
//!   production driver shells out to the tool's CLI; tests use fakes)
//! - **[`DriverRef`]** - shared handle (`Arc<dyn Driver>`) for passing
//!   drivers between the registry, the controller loop, and workers
//! - **[`Task`]** - the immutable descriptor a driver is built around
//! - **[`Drivers`]** - the concurrency-safe registry of task name to driver
//!
//! ## Rules
//! - `task()` is safe for concurrent reads; `render_template` and
//!   `apply_task` are never invoked concurrently for the same driver. The
//!   controller's dispatch loop and the active set enforce this, drivers do
//!   not need their own serialization.
//! - `render_template` returning `Ok(false)` means the template needs more
//!   catalog data and the cycle should be retried on the next dependency
//!   change; it is not an error.
//! - Implementations **must** observe the [`CancellationToken`] inside
//!   long-running render/apply calls and return [`DriverError::Canceled`]
//!   promptly on shutdown.

mod registry;
mod task;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;

pub use registry::Drivers;
pub use task::Task;

/// Shared handle to a driver object.
///
/// The registry owns the drivers; workers and the status API share them by
/// reference through this alias.
pub type DriverRef = Arc<dyn Driver>;

/// Capability set the controller consumes for one task.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Returns the immutable descriptor of the task this driver executes.
    fn task(&self) -> &Task;

    /// Returns the ids of the template(s) this driver renders.
    ///
    /// The registry indexes these so a template update can be traced back
    /// to its task.
    fn template_ids(&self) -> Vec<String>;

    /// Renders the task's template from current catalog state.
    ///
    /// Returns `Ok(true)` once the template is fully rendered, `Ok(false)`
    /// when rendering needs more wake-ups to fetch all dependencies.
    async fn render_template(&self, ctx: &CancellationToken) -> Result<bool, DriverError>;

    /// Invokes the infrastructure tool to realize the rendered plan.
    async fn apply_task(&self, ctx: &CancellationToken) -> Result<(), DriverError>;

    /// Enables the driver's template buffer period.
    ///
    /// Called once before the continuous loop enters its steady state so
    /// that bursts of catalog churn coalesce into fewer renders. Once mode
    /// skips this so the first render happens immediately.
    fn set_buffer_period(&self);
}
