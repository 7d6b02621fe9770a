//! Polling for resources the service creates asynchronously.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;

/// Retry budget for confirming an asynchronous creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of probe calls, including the first one. Zero is treated as
    /// one: a submitted resource is always looked for at least once.
    pub max_attempts: u32,
    pub interval: Duration,
    /// Overall deadline measured from the first probe.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    Found { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Result of a create request that the service completes in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Created,
    /// The resource appeared but the service marked it as failed.
    Failed { reason: String },
    /// The resource did not appear within the poll budget. It may still show
    /// up later.
    Pending { attempts: u32 },
}

impl CreationOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, CreationOutcome::Created)
    }
}

/// Call `probe` until it yields a value or the policy runs out.
///
/// `probe` receives the 1-based attempt number. Errors from the probe abort
/// polling and are returned as-is.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, mut probe: F) -> Result<PollOutcome<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    while attempts < max_attempts {
        attempts += 1;
        if let Some(value) = probe(attempts).await? {
            debug!(attempts, "Poll condition met");
            return Ok(PollOutcome::Found { value, attempts });
        }

        if attempts == max_attempts {
            break;
        }
        if let Some(timeout) = policy.timeout {
            if started.elapsed() + policy.interval > timeout {
                debug!(attempts, ?timeout, "Poll deadline reached");
                break;
            }
        }
        tokio::time::sleep(policy.interval).await;
    }

    Ok(PollOutcome::Exhausted { attempts })
}
