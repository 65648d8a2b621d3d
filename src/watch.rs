//! # Dependency watcher contract.
//!
//! The controller does not talk to the service catalog itself; a [`Watch`]
//! implementation monitors the templates' dependencies and resolves its
//! [`Watch::wait`] future whenever any of them changed. The concrete
//! watcher (catalog blocking queries, buffer periods) lives with the
//! template engine and is external to this crate.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WatchError;

/// Shared handle to a dependency watcher.
pub type WatcherRef = Arc<dyn Watch>;

/// Source of "dependencies changed" wake-ups for the controller.
#[async_trait]
pub trait Watch: Send + Sync + 'static {
    /// Completes with `Ok(())` on the next dependency change, or with an
    /// error when the watcher failed fatally and no further changes will
    /// be delivered.
    ///
    /// The controller additionally races this future against root-context
    /// cancellation, so implementations are free to block indefinitely;
    /// observing `ctx` as well is encouraged but not required.
    async fn wait(&self, ctx: &CancellationToken) -> Result<(), WatchError>;

    /// Number of dependencies currently monitored, reported at a low
    /// cadence by the controller's logs.
    fn size(&self) -> usize;
}
