//! The retrying fetcher: one outbound call with bounded retry.
//!
//! This is the unit of resilience for every remote call the engine makes.
//! Transport failures (timeouts, connection errors) are retried with a
//! linearly increasing backoff; a response that arrived, whatever its status
//! code, is returned to the caller untouched. The caller decides whether a
//! non-2xx status degrades to a fallback or aborts its phase.

use std::time::Duration;

use backon::{BackoffBuilder, Retryable};

use crate::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};

/// Default number of attempts per call.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Default base unit for the linear backoff.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Retry configuration for a single remote call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: usize,
    /// Base backoff unit; attempt `n` sleeps `n * base_delay` before retrying.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(attempts: usize, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// A policy with no sleeps, for tests.
    #[must_use]
    pub fn immediate(attempts: usize) -> Self {
        Self {
            attempts,
            base_delay: Duration::ZERO,
        }
    }

    fn backoff(&self) -> LinearBuilder {
        LinearBuilder {
            base_delay: self.base_delay,
            // Retries after the first attempt.
            max_times: self.attempts.saturating_sub(1),
        }
    }
}

/// Linear backoff builder: sleeps `1x, 2x, 3x, ...` the base unit.
///
/// backon ships constant, exponential, and fibonacci strategies; the
/// attempt-indexed linear schedule used here is small enough to define
/// in place.
#[derive(Debug, Clone, Copy)]
pub struct LinearBuilder {
    base_delay: Duration,
    max_times: usize,
}

impl BackoffBuilder for LinearBuilder {
    type Backoff = LinearBackoff;

    fn build(self) -> Self::Backoff {
        LinearBackoff {
            base_delay: self.base_delay,
            attempt: 0,
            max_times: self.max_times,
        }
    }
}

/// Iterator state for [`LinearBuilder`].
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base_delay: Duration,
    attempt: usize,
    max_times: usize,
}

impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_times {
            return None;
        }
        self.attempt += 1;
        Some(self.base_delay * self.attempt as u32)
    }
}

/// Send a request through the transport, retrying transport failures.
///
/// Returns the response as soon as one arrives, regardless of status code.
/// When every attempt fails at the transport level, the last error is
/// returned. Stateless and safe to invoke concurrently from many workers.
pub async fn send_with_retry(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    policy: RetryPolicy,
) -> Result<HttpResponse, HttpError> {
    let method = request.method;
    let url = request.url.clone();

    (|| transport.send(request.clone()))
        .retry(policy.backoff())
        .when(|e| matches!(e, HttpError::Transport(_)))
        .notify(|err, dur| {
            tracing::debug!(
                method = method.as_str(),
                url = %url,
                delay_ms = dur.as_millis() as u64,
                error = %err,
                "retrying request after transport failure"
            );
        })
        .await
}
