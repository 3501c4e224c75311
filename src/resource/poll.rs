//! Poll-to-completion
//!
//! Fixed-interval status polling for asynchronously provisioned resources.
//! No backoff, no jitter: the load this puts on the remote API is small and
//! predictable, which is what an operator-triggered provisioning tool wants.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::error::ApiError;

/// Default provisioning timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Default interval between status queries.
const DEFAULT_PERIOD: Duration = Duration::from_secs(10);

/// How long to wait for a resource to reach its terminal status, and how
/// often to ask.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub period: Duration,
}

impl PollPolicy {
    pub fn new(timeout: Duration, period: Duration) -> Self {
        Self { timeout, period }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            period: DEFAULT_PERIOD,
        }
    }
}

/// Why a wait ended without reaching the target status.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("did not reach \"{target}\" within {waited:?}")]
    TimedOut { target: String, waited: Duration },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Poll `fetch` until it reports `target`, sleeping `policy.period` between
/// queries. The first query happens immediately. Fails with
/// [`WaitError::TimedOut`] once the elapsed wait exceeds `policy.timeout`;
/// a failed status query aborts the wait outright.
pub async fn wait_for_status<F, Fut>(
    policy: &PollPolicy,
    target: &str,
    mut fetch: F,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    let started = Instant::now();

    loop {
        let status = fetch().await?;
        if status == target {
            return Ok(());
        }

        tracing::debug!(
            "status \"{}\", waiting for \"{}\" ({:?} elapsed)",
            status,
            target,
            started.elapsed()
        );

        sleep(policy.period).await;

        if started.elapsed() >= policy.timeout {
            return Err(WaitError::TimedOut {
                target: target.to_string(),
                waited: started.elapsed(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio_test::{assert_err, assert_ok};

    fn short_policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(60), Duration::from_secs(10))
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_target_after_k_queries() {
        let statuses = ["saving", "saving", "active"];
        let calls = Cell::new(0usize);

        let result = wait_for_status(&short_policy(), "active", || {
            let status = statuses[calls.get()].to_string();
            calls.set(calls.get() + 1);
            async move { Ok(status) }
        })
        .await;

        assert_ok!(result);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_target_needs_one_query() {
        let calls = Cell::new(0usize);

        let result = wait_for_status(&short_policy(), "active", || {
            calls.set(calls.get() + 1);
            async move { Ok("active".to_string()) }
        })
        .await;

        assert_ok!(result);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_roughly_timeout_over_period_queries() {
        let calls = Cell::new(0usize);

        let result = wait_for_status(&short_policy(), "active", || {
            calls.set(calls.get() + 1);
            async move { Ok("saving".to_string()) }
        })
        .await;

        let err = assert_err!(result);
        assert!(matches!(err, WaitError::TimedOut { .. }));
        // 60s timeout / 10s period: queries at t=0,10,20,30,40,50
        assert_eq!(calls.get(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_query_aborts_the_wait() {
        let result = wait_for_status(&short_policy(), "active", || async {
            Err(ApiError::Status {
                status: 500,
                detail: "backend down".into(),
            })
        })
        .await;

        let err = assert_err!(result);
        assert!(matches!(err, WaitError::Api(_)));
    }
}
