//! # Read-only status API.
//!
//! Serves JSON summaries of registered tasks and their recent outcome
//! events over HTTP. The API only reads registry snapshots and event
//! store copies, so it runs concurrently with the controller loop without
//! coordination.
//!
//! Routes:
//! - `GET /v1/status` - overall summary across all tasks
//! - `GET /v1/status/tasks` - per-task status for every registered task
//! - `GET /v1/status/tasks/:name` - one task's status with recent events

mod routes;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::driver::Drivers;
use crate::events::Store;

/// How long after cancellation in-flight requests may keep draining
/// before the server gives up on them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors produced by the status API server.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ApiError {
    /// The TCP listener could not be bound.
    #[error("unable to bind status API to {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The HTTP server failed while running.
    #[error("status API server failed")]
    Serve {
        #[source]
        source: io::Error,
    },
}

/// Shared read-only state behind the handlers.
struct ApiState {
    drivers: Arc<Drivers>,
    store: Arc<Store>,
}

/// Read-only HTTP status server over the registry and event store.
pub struct Api {
    port: u16,
    state: Arc<ApiState>,
}

impl Api {
    /// Creates a server for the given port over shared registry and store
    /// handles.
    pub fn new(port: u16, drivers: Arc<Drivers>, store: Arc<Store>) -> Self {
        Self {
            port,
            state: Arc::new(ApiState { drivers, store }),
        }
    }

    /// Builds the router serving the status routes.
    ///
    /// Exposed so embedders can mount the routes into a larger router and
    /// tests can drive handlers without binding a port.
    pub fn router(&self) -> Router {
        routes::router(Arc::clone(&self.state))
    }

    /// Binds the listener and serves until `ctx` is canceled.
    ///
    /// On cancellation the server stops accepting connections and drains
    /// in-flight requests, bounded by a short grace period.
    pub async fn serve(&self, ctx: &CancellationToken) -> Result<(), ApiError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiError::Bind { addr, source })?;
        info!(%addr, "serving status API");

        let shutdown = ctx.clone();
        let server = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await });

        tokio::select! {
            res = async { server.await } => res.map_err(|source| ApiError::Serve { source }),
            _ = async {
                ctx.cancelled().await;
                time::sleep(SHUTDOWN_GRACE).await;
            } => {
                warn!("status API shutdown grace elapsed before connections drained");
                Ok(())
            }
        }
    }
}
