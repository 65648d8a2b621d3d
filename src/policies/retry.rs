//! # Bounded retry with exponential backoff and jitter.
//!
//! [`Retry`] re-runs a failed action a bounded number of times, waiting
//! `base * 2^(k-1) * (1 + jitter)` before retry `k`, with `jitter` drawn
//! uniformly from `[0, 0.25]` to keep simultaneously-failing tasks from
//! retrying in lockstep.
//!
//! ## Rules
//! - `max_retries` counts retries **after** the initial attempt: an action
//!   runs at most `max_retries + 1` times.
//! - The policy is stateless per call and safe for concurrent use; the
//!   pseudo-random source is seeded at construction ([`Retry::with_seed`])
//!   or from the OS.
//! - Cancellation is honored during backoff waits: the call returns
//!   [`RetryError::Canceled`] immediately, wrapping the last underlying
//!   error.
//!
//! ## Example
//! ```
//! use driftsync::Retry;
//! use std::time::Duration;
//!
//! let retry = Retry::new(2).with_base(Duration::from_millis(100));
//! assert_eq!(retry.max_retries(), 2);
//! ```

use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Error returned by [`Retry::run`].
#[derive(Error, Debug)]
pub enum RetryError<E>
where
    E: StdError + 'static,
{
    /// Every attempt failed; carries the final underlying error and the
    /// total number of attempts made.
    #[error("giving up after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// The context was canceled during a backoff wait; carries the last
    /// underlying error observed before cancellation.
    #[error("canceled while waiting to retry")]
    Canceled {
        #[source]
        last: Option<E>,
    },
}

/// Bounded exponential-backoff retry policy.
#[derive(Clone, Copy, Debug)]
pub struct Retry {
    /// Number of retries after the initial attempt.
    max_retries: u32,
    /// Base delay for the first retry.
    base: Duration,
    /// Fixed jitter seed; `None` seeds from the OS per call.
    seed: Option<u64>,
}

impl Default for Retry {
    /// Returns a policy with 2 retries and a 1 second base delay.
    fn default() -> Self {
        Self::new(2)
    }
}

impl Retry {
    /// Creates a policy allowing `max_retries` retries after the initial
    /// attempt, with a 1 second base delay.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base: Duration::from_secs(1),
            seed: None,
        }
    }

    /// Overrides the base backoff delay.
    #[must_use]
    pub fn with_base(mut self, base: Duration) -> Self {
        self.base = base;
        self
    }

    /// Fixes the jitter seed, making delays deterministic.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the configured retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Runs `action`, retrying failures with backoff until it succeeds,
    /// the retry budget is exhausted, or `ctx` is canceled during a wait.
    ///
    /// `desc` labels the action in retry logs.
    pub async fn run<F, Fut, E>(
        &self,
        ctx: &CancellationToken,
        mut action: F,
        desc: &str,
    ) -> Result<(), RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: StdError + Send + Sync + 'static,
    {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut attempt: u32 = 0;
        loop {
            match action().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if attempt >= self.max_retries {
                        return Err(RetryError::Exhausted {
                            attempts: attempt + 1,
                            source: err,
                        });
                    }

                    let delay = self.backoff_delay(attempt, &mut rng);
                    warn!(
                        action = desc,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after failure"
                    );
                    tokio::select! {
                        _ = ctx.cancelled() => {
                            return Err(RetryError::Canceled { last: Some(err) });
                        }
                        _ = time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Computes the wait before retry `attempt + 1` (zero-based), i.e.
    /// `base * 2^attempt * (1 + jitter)`.
    fn backoff_delay(&self, attempt: u32, rng: &mut StdRng) -> Duration {
        let exp = 2u64.saturating_pow(attempt) as f64;
        let jitter: f64 = rng.random_range(0.0..=0.25);
        self.base.mul_f64(exp * (1.0 + jitter))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Error, Debug)]
    #[error("boom")]
    struct Boom;

    fn fast() -> Retry {
        Retry::new(2).with_base(Duration::from_millis(2))
    }

    #[tokio::test]
    async fn successful_action_runs_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        let ctx = CancellationToken::new();

        fast()
            .run::<_, _, Boom>(
                &ctx,
                move || {
                    let calls = Arc::clone(&counted);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                },
                "noop",
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_then_succeeding_action_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        let ctx = CancellationToken::new();

        fast()
            .run(
                &ctx,
                move || {
                    let calls = Arc::clone(&counted);
                    async move {
                        // Fail the first two attempts, succeed on the third.
                        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err(Boom)
                        } else {
                            Ok(())
                        }
                    }
                },
                "flaky",
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_attempt_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let counted = Arc::clone(&calls);
        let ctx = CancellationToken::new();

        let err = fast()
            .run(
                &ctx,
                move || {
                    let calls = Arc::clone(&counted);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(Boom)
                    }
                },
                "doomed",
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, RetryError::Exhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn cancellation_during_backoff_returns_promptly() {
        let retry = Retry::new(1).with_base(Duration::from_secs(30));
        let ctx = CancellationToken::new();

        let canceler = ctx.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(20)).await;
            canceler.cancel();
        });

        let res = time::timeout(
            Duration::from_secs(3),
            retry.run(&ctx, || async { Err::<(), _>(Boom) }, "stuck"),
        )
        .await
        .expect("cancellation must interrupt the backoff wait");

        assert!(matches!(res, Err(RetryError::Canceled { last: Some(_) })));
    }

    #[test]
    fn backoff_delay_doubles_and_stays_within_jitter_bounds() {
        let retry = Retry::new(3).with_base(Duration::from_millis(100));
        let mut rng = StdRng::seed_from_u64(42);

        for attempt in 0..3u32 {
            let lower = Duration::from_millis(100 * 2u64.pow(attempt));
            let upper = lower.mul_f64(1.25);
            let delay = retry.backoff_delay(attempt, &mut rng);
            assert!(delay >= lower && delay <= upper, "attempt {attempt}: {delay:?}");
        }
    }

    #[test]
    fn seeded_delays_are_deterministic() {
        let retry = Retry::new(2).with_base(Duration::from_millis(100));
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(retry.backoff_delay(1, &mut a), retry.backoff_delay(1, &mut b));
    }
}
