//! Waiting for executions to reach a terminal state.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quarry_common::{BackoffConfig, QuarryResult};
use tracing::debug;

use crate::execution::QueryExecution;

/// Delay before each status poll, as a function of the attempt number.
#[derive(Clone)]
pub enum Backoff {
    /// `base^attempt - 1` seconds, optionally capped.
    Exponential(BackoffConfig),
    /// Caller-supplied function.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl Backoff {
    /// Wraps a custom delay function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Backoff::Custom(Arc::new(f))
    }

    /// Polls without sleeping.
    pub fn immediate() -> Self {
        Self::custom(|_| Duration::ZERO)
    }

    /// Delay before the given attempt. Attempts start at 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Exponential(config) => config.delay(attempt),
            Backoff::Custom(f) => f(attempt),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential(BackoffConfig::default())
    }
}

impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        Backoff::Exponential(config)
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backoff::Exponential(config) => f.debug_tuple("Exponential").field(config).finish(),
            Backoff::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Sleeps, polls, and repeats until `poll` returns a terminal execution.
///
/// The first sleep uses attempt 1. Poll errors end the wait immediately.
pub async fn wait_until_terminal<F, Fut>(backoff: &Backoff, mut poll: F) -> QuarryResult<QueryExecution>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = QuarryResult<QueryExecution>>,
{
    let mut attempt: u32 = 1;
    loop {
        let delay = backoff.delay(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let execution = poll().await?;
        if execution.is_terminal() {
            debug!(query_id = execution.id(), state = %execution.state(), attempt, "query reached terminal state");
            return Ok(execution);
        }

        debug!(query_id = execution.id(), state = %execution.state(), attempt, "query still in progress");
        attempt = attempt.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::QueryState;
    use parking_lot::Mutex;
    use quarry_common::QuarryError;
    use std::collections::VecDeque;

    fn scripted(states: &[QueryState]) -> Mutex<VecDeque<QueryState>> {
        Mutex::new(states.iter().copied().collect())
    }

    #[test]
    fn test_default_backoff() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_millis(500));
        assert_eq!(backoff.delay(2), Duration::from_millis(1250));
    }

    #[tokio::test]
    async fn test_waits_until_terminal() {
        let states = scripted(&[QueryState::Queued, QueryState::Running, QueryState::Finished]);
        let attempts = Mutex::new(Vec::new());
        let backoff = Backoff::immediate();
        let mut polls = 0;

        let execution = wait_until_terminal(&backoff, || {
            polls += 1;
            let state = states.lock().pop_front().unwrap_or(QueryState::Finished);
            attempts.lock().push(polls);
            async move { Ok(QueryExecution::new("q", state, None, None)) }
        })
        .await
        .unwrap();

        assert!(execution.is_finished());
        assert_eq!(polls, 3);
        assert_eq!(*attempts.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_custom_backoff_sees_attempts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let backoff = Backoff::custom(move |attempt| {
            recorder.lock().push(attempt);
            Duration::ZERO
        });
        let states = scripted(&[QueryState::Queued, QueryState::Queued, QueryState::Cancelled]);

        let execution = wait_until_terminal(&backoff, || {
            let state = states.lock().pop_front().unwrap_or(QueryState::Cancelled);
            async move { Ok(QueryExecution::new("q", state, None, None)) }
        })
        .await
        .unwrap();

        assert!(execution.is_cancelled());
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_poll_error_aborts() {
        let mut polls = 0;
        let result = wait_until_terminal(&Backoff::immediate(), || {
            polls += 1;
            async {
                Err(QuarryError::UnsupportedStatus {
                    status: "PAUSED".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(QuarryError::UnsupportedStatus { .. })));
        assert_eq!(polls, 1);
    }
}
