//! Bounded waits for network-bound work.
//!
//! A URL fetch must never hang a request handler. [`with_timeout`] races a
//! future against a [`Deadline`] and turns expiry into
//! [`DetectorError::Timeout`].

use crate::error::{DetectorError, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound for one remote verification call.
pub const REMOTE_CHECK_TIMEOUT_SECONDS: u64 = 10;

/// Default bound for fetching media by URL.
pub const URL_FETCH_TIMEOUT_SECONDS: u64 = 30;

/// A named upper bound on one operation.
#[derive(Debug, Clone)]
pub struct Deadline {
    pub duration: Duration,
    pub operation: String,
}

impl Deadline {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            operation: operation.into(),
        }
    }

    fn seconds(&self) -> u64 {
        // Sub-second deadlines still report a non-zero bound
        self.duration.as_secs().max(1)
    }
}

/// Await `future`, failing with `Timeout` once the deadline passes.
///
/// Errors produced by the future itself pass through unchanged.
pub async fn with_timeout<T, F>(deadline: Deadline, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(operation = %deadline.operation, seconds = deadline.seconds(), "bounded wait");
    match tokio::time::timeout(deadline.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                "{} gave up after {}s",
                deadline.operation,
                deadline.seconds()
            );
            Err(DetectorError::Timeout {
                seconds: deadline.seconds(),
            })
        }
    }
}
