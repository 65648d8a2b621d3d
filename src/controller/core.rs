//! # Controller core: once and continuous execution modes.
//!
//! Both modes share the per-task execution unit
//! ([`check_apply`](super::exec::check_apply)) and differ only in
//! scheduling:
//!
//! - **Once mode** ([`Controller::once`]) drives every registered task to
//!   its first completed cycle, failing fast on the first error.
//! - **Continuous mode** ([`Controller::run`]) waits for dependency
//!   changes and dispatches one worker per inactive task each tick,
//!   logging per-task errors without stopping.
//!
//! ## Rules
//! - At most one execution is in flight per task: the dispatch loop
//!   launches one worker per task and joins them all before the next
//!   tick, and tasks marked active by an ad-hoc execution are skipped.
//! - Buffer periods are enabled once, before the first continuous tick,
//!   never in once mode.
//! - Worker panics are not swallowed; a panicking driver takes the
//!   controller down.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::api::{Api, ApiError};
use crate::config::Config;
use crate::controller::exec::check_apply;
use crate::driver::{DriverRef, Drivers};
use crate::error::{CtrlError, RegistryError};
use crate::events::Store;
use crate::policies::Retry;
use crate::watch::WatcherRef;

/// Log the monitored dependency count every this many loop iterations.
const DEP_LOG_CADENCE: u64 = 50;

/// Task execution controller.
///
/// Owns the driver registry, the event store, and the retry policy, and
/// exposes the programmatic entry points an embedding program wires
/// together: [`init`](Controller::init), [`once`](Controller::once),
/// [`run`](Controller::run), [`serve_api`](Controller::serve_api).
pub struct Controller {
    conf: Config,
    drivers: Arc<Drivers>,
    store: Arc<Store>,
    retry: Retry,
    watcher: WatcherRef,

    /// Only populated via [`Controller::enable_test_mode`]; receives the
    /// name of every task that completed a cycle in continuous mode.
    task_notify: Option<mpsc::Sender<String>>,
}

impl Controller {
    /// Creates a controller around the given watcher with an empty
    /// registry.
    pub fn new(conf: Config, watcher: WatcherRef) -> Self {
        let retry = Retry::new(conf.retries).with_base(conf.backoff_base);
        Self {
            conf,
            drivers: Arc::new(Drivers::new()),
            store: Arc::new(Store::new()),
            retry,
            watcher,
            task_notify: None,
        }
    }

    /// Populates the registry from the configured drivers.
    ///
    /// Each driver registers under its task's name. The task set is fixed
    /// after this call.
    pub async fn init(&self, drivers: Vec<DriverRef>) -> Result<(), RegistryError> {
        for driver in drivers {
            let name = driver.task().name().to_string();
            self.drivers.add(&name, driver).await?;
        }
        info!(tasks = self.drivers.len().await, "controller initialized");
        Ok(())
    }

    /// Shared registry handle, read by the status API and ad-hoc callers.
    pub fn drivers(&self) -> Arc<Drivers> {
        Arc::clone(&self.drivers)
    }

    /// Shared event store handle.
    pub fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Runs every task to its first completed cycle, then returns.
    ///
    /// Applies are direct (no retry) so a broken task surfaces
    /// immediately: any per-task error aborts the run. Partial progress
    /// stays recorded in the event store.
    pub async fn once(&self, ctx: &CancellationToken) -> Result<(), CtrlError> {
        info!("executing all tasks once through");

        let drivers = self.drivers.snapshot().await;
        let mut completed: HashMap<String, bool> =
            drivers.keys().map(|name| (name.clone(), false)).collect();

        let mut iter: u64 = 0;
        loop {
            let mut done = true;
            for (name, driver) in &drivers {
                if completed[name] {
                    continue;
                }
                let complete = check_apply(ctx, driver, &self.store, None).await?;
                completed.insert(name.clone(), complete);
                if !complete {
                    done = false;
                }
            }
            self.log_dep_size(iter);
            iter += 1;

            if done {
                info!("all tasks completed once");
                return Ok(());
            }

            self.wait_for_change(ctx).await?;
        }
    }

    /// Continuously monitors dependencies and re-runs changed tasks.
    ///
    /// Precondition: [`once`](Controller::once) has completed, so every
    /// driver holds a fresh render. Blocks until the watcher fails or
    /// `ctx` is canceled; per-task errors are logged and do not terminate
    /// the loop.
    pub async fn run(&self, ctx: &CancellationToken) -> Result<(), CtrlError> {
        // Buffer periods only make sense for the steady-state loop; once
        // mode must render immediately.
        self.drivers.set_buffer_period().await;

        let mut iter: u64 = 1;
        loop {
            self.wait_for_change(ctx).await?;
            self.run_tasks(ctx).await;
            self.log_dep_size(iter);
            iter += 1;
        }
    }

    /// Blocks until the next dependency change, watcher failure, or
    /// cancellation.
    async fn wait_for_change(&self, ctx: &CancellationToken) -> Result<(), CtrlError> {
        tokio::select! {
            _ = ctx.cancelled() => {
                info!("stopping controller");
                Err(CtrlError::Canceled)
            }
            res = self.watcher.wait(ctx) => res.map_err(|err| {
                error!(error = %err, "error watching template dependencies");
                CtrlError::Watch(err)
            }),
        }
    }

    /// One tick: dispatches a worker per inactive task and joins them
    /// all, logging per-task errors.
    async fn run_tasks(&self, ctx: &CancellationToken) {
        let mut workers = JoinSet::new();
        for (name, driver) in self.drivers.snapshot().await {
            if self.drivers.is_active(&name) {
                // An ad-hoc execution owns this task right now; other
                // tasks may still have updates, keep dispatching.
                trace!(task = %name, "task is active");
                continue;
            }

            let store = Arc::clone(&self.store);
            let retry = self.retry;
            let notify = self.task_notify.clone();
            let ctx = ctx.clone();
            workers.spawn(async move {
                let res = check_apply(&ctx, &driver, &store, Some(&retry)).await;
                if let (Some(tx), Ok(true)) = (&notify, &res) {
                    let _ = tx.send(name).await;
                }
                res
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(_)) => {}
                Ok(Err(err)) => error!(error = %err, "error running task"),
                Err(join_err) if join_err.is_panic() => {
                    std::panic::resume_unwind(join_err.into_panic())
                }
                Err(join_err) => error!(error = %join_err, "task worker failed"),
            }
        }
    }

    /// Runs a single task out-of-band, outside the continuous loop.
    ///
    /// Marks the task active for the duration so the loop skips it,
    /// preventing concurrent overlap on the same driver. Fails with
    /// [`CtrlError::TaskActive`] when an execution is already in flight
    /// and [`RegistryError::NotFound`] for unknown tasks.
    pub async fn trigger_task(&self, ctx: &CancellationToken, name: &str) -> Result<bool, CtrlError> {
        let driver = self
            .drivers
            .get(name)
            .await
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;

        if self.drivers.is_active(name) {
            return Err(CtrlError::TaskActive {
                name: name.to_string(),
            });
        }
        self.drivers.set_active(name);
        let res = check_apply(ctx, &driver, &self.store, Some(&self.retry)).await;
        self.drivers.set_inactive(name);
        res
    }

    /// Serves the read-only status API until `ctx` is canceled.
    pub async fn serve_api(&self, ctx: &CancellationToken) -> Result<(), ApiError> {
        Api::new(self.conf.port, self.drivers(), self.store())
            .serve(ctx)
            .await
    }

    /// Enables the task-notify test hook.
    ///
    /// The returned receiver yields the name of every task whose cycle
    /// completed in continuous mode. Callers must drain it; the channel is
    /// only sized to the current driver count.
    pub async fn enable_test_mode(&mut self) -> mpsc::Receiver<String> {
        let capacity = self.drivers.len().await.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        self.task_notify = Some(tx);
        rx
    }

    /// Low-cadence visibility into how many dependencies the watcher is
    /// tracking.
    fn log_dep_size(&self, iter: u64) {
        if iter % DEP_LOG_CADENCE == 0 {
            debug!(dependencies = self.watcher.size(), "monitored dependencies");
        }
    }
}
