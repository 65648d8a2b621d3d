//! # Outcome events and their bounded store.
//!
//! Every full render-and-apply cycle of a task produces one [`Event`]
//! recording what ran, when, and how it ended. The [`Store`] keeps a short
//! per-task history of finalized events for the status API.
//!
//! Partial renders (a template still waiting on catalog data) do not
//! produce events; only complete cycles do.

mod event;
mod store;

pub use event::Event;
pub use store::{Store, DEFAULT_EVENT_CAPACITY};
