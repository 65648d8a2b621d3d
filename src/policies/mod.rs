//! # Execution policies.
//!
//! Currently a single policy: bounded exponential-backoff [`Retry`] used
//! by the continuous loop around task applies.

mod retry;

pub use retry::{Retry, RetryError};
