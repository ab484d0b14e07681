//! Confirmation polling.
//!
//! Both facilitator flows poll the chain through one loop, [`retry_until`],
//! and differ only in the predicate that decides whether an attempt's
//! outcome is worth another try:
//!
//! ```text
//!              ┌────────────┐
//!   attempt ──▶│   fetch    │──cancel──▶ Cancelled
//!              └─────┬──────┘
//!                    │
//!           should_retry(outcome)?
//!            │                 │
//!            no               yes
//!            │                 │
//!            ▼                 ▼
//!        Terminal     attempts left? ──no──▶ Exhausted: one final fetch
//!                              │
//!                             yes
//!                              ▼
//!                   wait `interval` ──cancel──▶ Cancelled
//! ```

use super::transaction::CanonicalTransaction;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Retry budget for a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Attempts before the final fetch.
    pub max_attempts: u32,
    /// Wait between attempts.
    pub interval: Duration,
}

impl PollPolicy {
    /// Create a policy.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on time spent waiting between attempts.
    #[must_use]
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Invoke `fetch` until `should_retry` rejects its outcome, the budget runs
/// out, or `cancel` fires.
///
/// When the budget is exhausted, one final fetch is made and its outcome is
/// returned as is, so the caller always sees the most recent chain state.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancel` fires before an attempt, while a
/// fetch is in flight or during a wait, and otherwise whatever error the
/// deciding fetch produced.
pub async fn retry_until<T, F, Fut, P>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut fetch: F,
    should_retry: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Result<T>) -> bool,
{
    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let outcome = until_cancelled(cancel, fetch()).await;
        if outcome.as_ref().is_err_and(Error::is_cancelled) {
            info!("Poll cancelled during attempt {attempt}");
            return outcome;
        }
        if !should_retry(&outcome) {
            debug!("Poll settled after {attempt} attempt(s)");
            return outcome;
        }

        if let Err(e) = &outcome {
            debug!(
                "Poll attempt {attempt}/{} failed: {e}",
                policy.max_attempts
            );
        }

        tokio::select! {
            () = cancel.cancelled() => {
                info!("Poll cancelled after {attempt} attempt(s)");
                return Err(Error::Cancelled);
            }
            () = tokio::time::sleep(policy.interval) => {}
        }
    }

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    warn!(
        "Poll budget of {} attempt(s) exhausted, returning latest state",
        policy.max_attempts
    );
    until_cancelled(cancel, fetch()).await
}

/// Drive `work` to completion unless `cancel` fires first.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] if `cancel` fires before `work` completes,
/// and otherwise whatever `work` produced.
pub async fn until_cancelled<T, Fut>(cancel: &CancellationToken, work: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        outcome = work => outcome,
    }
}

/// Retry only failed fetches; any transaction, pending or not, ends the loop.
#[must_use]
pub fn retry_on_error(outcome: &Result<CanonicalTransaction>) -> bool {
    outcome.is_err()
}

/// Retry failed fetches and transactions that have not reached a terminal
/// lifecycle state.
#[must_use]
pub fn retry_until_terminal(outcome: &Result<CanonicalTransaction>) -> bool {
    match outcome {
        Ok(tx) => !tx.lifecycle().is_terminal(),
        Err(_) => true,
    }
}

/// Fetch a transaction, retrying transport and normalization failures.
///
/// # Errors
///
/// See [`retry_until`].
pub async fn fetch_with_retry<F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    fetch: F,
) -> Result<CanonicalTransaction>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CanonicalTransaction>>,
{
    retry_until(policy, cancel, fetch, retry_on_error).await
}

/// Fetch a transaction until it is confirmed or failed.
///
/// # Errors
///
/// See [`retry_until`].
pub async fn await_terminal<F, Fut>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    fetch: F,
) -> Result<CanonicalTransaction>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CanonicalTransaction>>,
{
    retry_until(policy, cancel, fetch, retry_until_terminal).await
}
