//! # driftsync
//!
//! **Driftsync** continuously translates observed service-catalog state
//! into infrastructure changes executed through pluggable task drivers.
//!
//! Operators declare **tasks**; each task names the services to monitor,
//! a set of providers, and a source module. Whenever the monitored
//! services change, the controller re-renders the task's template and
//! applies the resulting plan through the task's [`Driver`].
//!
//! | Area            | Description                                                        | Key types / traits            |
//! |-----------------|--------------------------------------------------------------------|-------------------------------|
//! | **Drivers**     | Per-task handle over the external infrastructure tool.             | [`Driver`], [`Task`], [`Drivers`] |
//! | **Controller**  | Once and continuous execution modes over one execution unit.       | [`Controller`]                |
//! | **Events**      | Bounded per-task history of execution outcomes.                    | [`Event`], [`Store`]          |
//! | **Policies**    | Bounded exponential-backoff retry for applies.                     | [`Retry`]                     |
//! | **Watching**    | Dependency-change wake-ups driving the loop.                       | [`Watch`]                     |
//! | **Status API**  | Read-only JSON view over registry and events.                      | [`Api`]                       |
//! | **Errors**      | Typed per-subsystem errors with stable labels.                     | [`CtrlError`], [`DriverError`] |
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! use driftsync::{
//!     Config, Controller, Driver, DriverError, DriverRef, Task, Watch, WatchError,
//! };
//!
//! // A driver that renders instantly and applies nothing.
//! struct NullDriver {
//!     task: Task,
//! }
//!
//! #[async_trait]
//! impl Driver for NullDriver {
//!     fn task(&self) -> &Task {
//!         &self.task
//!     }
//!     fn template_ids(&self) -> Vec<String> {
//!         vec!["tmpl-web".to_string()]
//!     }
//!     async fn render_template(&self, _ctx: &CancellationToken) -> Result<bool, DriverError> {
//!         Ok(true)
//!     }
//!     async fn apply_task(&self, _ctx: &CancellationToken) -> Result<(), DriverError> {
//!         Ok(())
//!     }
//!     fn set_buffer_period(&self) {}
//! }
//!
//! // A watcher that pretends dependencies change every five seconds.
//! struct Ticker;
//!
//! #[async_trait]
//! impl Watch for Ticker {
//!     async fn wait(&self, _ctx: &CancellationToken) -> Result<(), WatchError> {
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!         Ok(())
//!     }
//!     fn size(&self) -> usize {
//!         1
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctrl = Controller::new(Config::default(), Arc::new(Ticker));
//!
//!     let driver: DriverRef = Arc::new(NullDriver {
//!         task: Task::new("web", "registry/web-module"),
//!     });
//!     ctrl.init(vec![driver]).await?;
//!
//!     let ctx = CancellationToken::new();
//!     ctrl.once(&ctx).await?;  // drive every task to a first apply
//!     ctrl.run(&ctx).await?;   // then monitor for changes indefinitely
//!     Ok(())
//! }
//! ```
//!
//! ---

mod api;
mod config;
mod controller;
mod driver;
mod error;
mod events;
mod exit;
mod policies;
mod watch;

// ---- Public re-exports ----

pub use api::{Api, ApiError};
pub use config::Config;
pub use controller::Controller;
pub use driver::{Driver, DriverRef, Drivers, Task};
pub use error::{CtrlError, DriverError, RegistryError, StoreError, WatchError};
pub use events::{Event, Store, DEFAULT_EVENT_CAPACITY};
pub use exit::{
    exit_code, EXIT_CODE_CONFIG_ERROR, EXIT_CODE_DRIVER_ERROR, EXIT_CODE_ERROR,
    EXIT_CODE_INTERRUPT, EXIT_CODE_OK, EXIT_CODE_PARSE_FLAGS_ERROR,
    EXIT_CODE_REQUIRED_FLAGS_ERROR,
};
pub use policies::{Retry, RetryError};
pub use watch::{Watch, WatcherRef};
