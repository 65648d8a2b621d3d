//! # Per-task execution unit: render, apply, record.
//!
//! [`check_apply`] performs one render-and-possibly-apply cycle for a
//! single driver and records the outcome in the event store.
//!
//! ## Rules
//! - Disabled tasks complete immediately and record nothing.
//! - A template that is not fully rendered yet (`Ok(false)` from the
//!   driver) records **no** event: rendering may take several wake-ups to
//!   fetch all dependencies, and only full cycles are audited.
//! - Every other terminal outcome of a cycle (render error, apply success,
//!   apply failure) finalizes exactly one event and stores it.
//! - An already-canceled context returns promptly without touching the
//!   store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::driver::DriverRef;
use crate::error::CtrlError;
use crate::events::{Event, Store};
use crate::policies::{Retry, RetryError};

/// Runs one render-and-possibly-apply cycle for `driver`.
///
/// Returns `Ok(true)` when the cycle completed (applied, or the task is
/// disabled), `Ok(false)` when the template still needs more catalog data,
/// and an error when rendering or applying failed.
///
/// `retry` selects the apply mode: `None` applies directly (once mode),
/// `Some` routes the apply through the retry policy (continuous mode).
pub(crate) async fn check_apply(
    ctx: &CancellationToken,
    driver: &DriverRef,
    store: &Store,
    retry: Option<&Retry>,
) -> Result<bool, CtrlError> {
    let task = driver.task();
    let name = task.name().to_string();

    if !task.is_enabled() {
        trace!(task = %name, "skipping disabled task");
        return Ok(true);
    }
    if ctx.is_cancelled() {
        return Err(CtrlError::Canceled);
    }

    let mut event = Event::new(
        name.clone(),
        task.provider_names().to_vec(),
        task.service_names().to_vec(),
        task.source(),
    )?;

    let rendered = match driver.render_template(ctx).await {
        Ok(rendered) => rendered,
        Err(source) => {
            let err = CtrlError::Render { task: name, source };
            event.finish(Some(err.to_string()));
            store_event(store, event);
            return Err(err);
        }
    };

    // Rendering may take several cycles to completely fetch new data; a
    // partial render is not a terminal outcome and records no event.
    if !rendered {
        trace!(task = %name, "template not fully rendered");
        return Ok(false);
    }

    info!(task = %name, "executing task");
    let applied = match retry {
        Some(policy) => {
            let desc = format!("apply task {name}");
            policy
                .run(
                    ctx,
                    || {
                        let driver = Arc::clone(driver);
                        let ctx = ctx.clone();
                        async move { driver.apply_task(&ctx).await }
                    },
                    &desc,
                )
                .await
                .map_err(|err| match err {
                    RetryError::Exhausted { attempts, source } => CtrlError::RetryExhausted {
                        task: name.clone(),
                        attempts,
                        source,
                    },
                    RetryError::Canceled { .. } => CtrlError::Canceled,
                })
        }
        None => driver.apply_task(ctx).await.map_err(|source| CtrlError::Apply {
            task: name.clone(),
            source,
        }),
    };

    match applied {
        Ok(()) => {
            event.finish(None);
            store_event(store, event);
            info!(task = %name, "task completed");
            Ok(true)
        }
        Err(err) => {
            event.finish(Some(err.to_string()));
            store_event(store, event);
            Err(err)
        }
    }
}

/// Stores a finalized event; a store fault must not mask the cycle's own
/// outcome, so it is only logged.
fn store_event(store: &Store, event: Event) {
    trace!(task = %event.task_name, success = event.success, "adding event");
    if let Err(err) = store.add(event) {
        error!(error = %err, "error storing event");
    }
}
