#![allow(dead_code)]

//! Shared fakes for the controller integration tests.
//!
//! [`FakeDriver`] is scriptable per call: queue render/apply outcomes up
//! front, then assert on call counters. [`FakeWatcher`] turns a channel
//! send into one "dependencies changed" wake-up.

use std::collections::VecDeque;
use std::future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use driftsync::{Config, Driver, DriverError, Task, Watch, WatchError};

static INIT: Once = Once::new();

/// Initialise tracing for tests; output only shows for failing tests
/// unless run with `-- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Config tuned for tests: fast backoff, port 0.
pub fn test_config() -> Config {
    Config {
        port: 0,
        retries: 2,
        backoff_base: Duration::from_millis(5),
    }
}

/// Scriptable driver with call counters.
pub struct FakeDriver {
    task: Task,
    templates: Vec<String>,
    renders: Mutex<VecDeque<Result<bool, DriverError>>>,
    applies: Mutex<VecDeque<Result<(), DriverError>>>,
    fail_applies: Option<String>,
    hang_on_apply: bool,
    render_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    buffered: AtomicBool,
}

impl FakeDriver {
    /// An enabled driver that renders on the first call and applies
    /// cleanly unless scripted otherwise.
    pub fn new(name: &str) -> Self {
        Self {
            task: Task::new(name, "registry/test-module")
                .with_providers(vec!["fake".to_string()])
                .with_services(vec![format!("{name}-svc")]),
            templates: vec![format!("tmpl-{name}")],
            renders: Mutex::new(VecDeque::new()),
            applies: Mutex::new(VecDeque::new()),
            fail_applies: None,
            hang_on_apply: false,
            render_calls: AtomicUsize::new(0),
            apply_calls: AtomicUsize::new(0),
            buffered: AtomicBool::new(false),
        }
    }

    /// Marks the task disabled.
    pub fn disabled(mut self) -> Self {
        self.task = self.task.with_enabled(false);
        self
    }

    /// Scripts the outcome of successive `render_template` calls; once
    /// the script runs out, renders succeed.
    pub fn renders(self, script: Vec<Result<bool, DriverError>>) -> Self {
        *self.renders.lock().unwrap() = script.into();
        self
    }

    /// Scripts the outcome of successive `apply_task` calls; once the
    /// script runs out, applies succeed.
    pub fn applies(self, script: Vec<Result<(), DriverError>>) -> Self {
        *self.applies.lock().unwrap() = script.into();
        self
    }

    /// Makes every apply fail with the given reason.
    pub fn always_fail_apply(mut self, reason: &str) -> Self {
        self.fail_applies = Some(reason.to_string());
        self
    }

    /// Makes applies block until the context is canceled.
    pub fn hang_on_apply(mut self) -> Self {
        self.hang_on_apply = true;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn render_calls(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub fn buffer_enabled(&self) -> bool {
        self.buffered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for FakeDriver {
    fn task(&self) -> &Task {
        &self.task
    }

    fn template_ids(&self) -> Vec<String> {
        self.templates.clone()
    }

    async fn render_template(&self, _ctx: &CancellationToken) -> Result<bool, DriverError> {
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        self.renders.lock().unwrap().pop_front().unwrap_or(Ok(true))
    }

    async fn apply_task(&self, ctx: &CancellationToken) -> Result<(), DriverError> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_apply {
            ctx.cancelled().await;
            return Err(DriverError::Canceled);
        }
        if let Some(reason) = &self.fail_applies {
            return Err(DriverError::Apply {
                reason: reason.clone(),
            });
        }
        self.applies.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn set_buffer_period(&self) {
        self.buffered.store(true, Ordering::SeqCst);
    }
}

/// Watcher fed by a channel: every `Ok(())` sent is one dependency-change
/// tick; an `Err` is a fatal watcher failure.
pub struct FakeWatcher {
    rx: tokio::sync::Mutex<mpsc::Receiver<Result<(), WatchError>>>,
    size: usize,
}

impl FakeWatcher {
    pub fn pair() -> (Arc<Self>, mpsc::Sender<Result<(), WatchError>>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Arc::new(Self {
                rx: tokio::sync::Mutex::new(rx),
                size: 1,
            }),
            tx,
        )
    }
}

#[async_trait]
impl Watch for FakeWatcher {
    async fn wait(&self, _ctx: &CancellationToken) -> Result<(), WatchError> {
        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Some(res) => res,
            // All senders dropped: no further changes will ever arrive.
            None => future::pending().await,
        }
    }

    fn size(&self) -> usize {
        self.size
    }
}

/// Receives from a notify channel with an upper bound.
pub async fn recv_within(rx: &mut mpsc::Receiver<String>, dur: Duration) -> Option<String> {
    timeout(dur, rx.recv()).await.ok().flatten()
}

/// Polls `check` until it returns true or the deadline passes.
pub async fn wait_until(dur: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + dur;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    check()
}
