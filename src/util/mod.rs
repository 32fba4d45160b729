//! Utility module
//!
//! Bounded retry-with-delay used wherever the driver waits on the device.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::core::{Result, SessionConfig};

/// Bounded polling: retry an attempt until it yields a value or time runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time allowed
    pub timeout: Duration,
    /// Delay after an attempt that produced nothing
    pub interval: Duration,
}

impl PollPolicy {
    /// Creates a new polling policy
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        PollPolicy { timeout, interval }
    }

    /// Same interval, different overall bound
    pub fn with_timeout(self, timeout: Duration) -> Self {
        PollPolicy { timeout, ..self }
    }

    /// Runs `attempt` until it returns `Some`, an error, or the deadline passes
    ///
    /// At least one attempt is always made. Returns `Ok(None)` on expiry.
    pub fn poll<T, F>(&self, mut attempt: F) -> Result<Option<T>>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(value) = attempt()? {
                return Ok(Some(value));
            }
            match self.next_delay(deadline) {
                Some(delay) => std::thread::sleep(delay),
                None => return Ok(None),
            }
        }
    }

    /// Async variant of [`PollPolicy::poll`], yielding to the runtime between attempts
    pub async fn poll_async<T, F, Fut>(&self, mut attempt: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(value) = attempt().await? {
                return Ok(Some(value));
            }
            match self.next_delay(deadline) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Ok(None),
            }
        }
    }

    /// Delay before the next attempt, or `None` once the deadline has passed
    fn next_delay(&self, deadline: Instant) -> Option<Duration> {
        let remaining = deadline.checked_duration_since(Instant::now())?;
        if remaining.is_zero() {
            return None;
        }
        Some(self.interval.min(remaining))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for PollPolicy {
    fn from(config: &SessionConfig) -> Self {
        PollPolicy::new(config.response_timeout, config.poll_interval)
    }
}
