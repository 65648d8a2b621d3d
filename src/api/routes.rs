//! Status route handlers.
//!
//! Handlers derive a task's health from its most recent event: successful
//! when the newest event succeeded, errored when it failed, unknown when
//! the task has not completed a full cycle yet.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::ApiState;
use crate::driver::DriverRef;
use crate::events::Event;

/// Health of one task, derived from its newest event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum TaskHealth {
    Successful,
    Errored,
    Unknown,
}

/// Summary across all registered tasks.
#[derive(Debug, Serialize)]
struct OverallStatus {
    task_count: usize,
    successful: usize,
    errored: usize,
    unknown: usize,
}

/// Status of a single task.
#[derive(Debug, Serialize)]
struct TaskStatus {
    name: String,
    enabled: bool,
    providers: Vec<String>,
    services: Vec<String>,
    source: String,
    health: TaskHealth,
    /// Recent events, newest first. Only present on the detail route.
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<Event>>,
}

pub(super) fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/v1/status", get(overall_status))
        .route("/v1/status/tasks", get(all_task_statuses))
        .route("/v1/status/tasks/:name", get(task_status))
        .with_state(state)
}

fn health_of(events: &[Event]) -> TaskHealth {
    match events.first() {
        None => TaskHealth::Unknown,
        Some(ev) if ev.success => TaskHealth::Successful,
        Some(_) => TaskHealth::Errored,
    }
}

fn task_status_of(name: &str, driver: &DriverRef, events: Vec<Event>, detail: bool) -> TaskStatus {
    let task = driver.task();
    TaskStatus {
        name: name.to_string(),
        enabled: task.is_enabled(),
        providers: task.provider_names().to_vec(),
        services: task.service_names().to_vec(),
        source: task.source().to_string(),
        health: health_of(&events),
        events: detail.then_some(events),
    }
}

async fn overall_status(State(state): State<Arc<ApiState>>) -> Json<OverallStatus> {
    let snapshot = state.drivers.snapshot().await;
    let mut status = OverallStatus {
        task_count: snapshot.len(),
        successful: 0,
        errored: 0,
        unknown: 0,
    };

    for name in snapshot.keys() {
        match health_of(&state.store.read(name)) {
            TaskHealth::Successful => status.successful += 1,
            TaskHealth::Errored => status.errored += 1,
            TaskHealth::Unknown => status.unknown += 1,
        }
    }
    Json(status)
}

async fn all_task_statuses(State(state): State<Arc<ApiState>>) -> Json<Vec<TaskStatus>> {
    let snapshot = state.drivers.snapshot().await;
    let mut statuses: Vec<TaskStatus> = snapshot
        .iter()
        .map(|(name, driver)| task_status_of(name, driver, state.store.read(name), false))
        .collect();
    statuses.sort_by(|a, b| a.name.cmp(&b.name));
    Json(statuses)
}

async fn task_status(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<TaskStatus>, StatusCode> {
    let driver = state.drivers.get(&name).await.ok_or(StatusCode::NOT_FOUND)?;
    let events = state.store.read(&name);
    Ok(Json(task_status_of(&name, &driver, events, true)))
}
