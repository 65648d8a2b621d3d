//! # Task execution controller.
//!
//! The controller owns the scheduling loop that turns dependency changes
//! into task executions:
//!
//! ```text
//! Watcher ──► Controller::run()
//!               │  (per tick)
//!               ├──► registry snapshot, skip active tasks
//!               ├──► one worker per task ──► check_apply ──► Event Store
//!               └──► join workers, log per-task errors
//! ```
//!
//! [`Controller::once`] drives every task to its first completed cycle and
//! returns; [`Controller::run`] then monitors for changes indefinitely.
//! Both share the same per-task execution unit.

mod core;
mod exec;

pub use core::Controller;
