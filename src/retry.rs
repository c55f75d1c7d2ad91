//! Retry policy layered on top of a [`Fetch`] implementation.
//!
//! The core client classifies and returns every failure as-is. `Retrying`
//! wraps any fetcher and retries throttling responses (429), server errors
//! (5xx) and transport failures with exponential backoff and jitter. Client
//! errors such as 403 or 404 are returned immediately.

use super::config::EdgarUrls;
use super::core::FetchResponse;
use super::error::{EdgarError, Result};
use super::traits::Fetch;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Base delay, doubled on every retry.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Calculates the wait duration for a retry attempt.
    ///
    /// Exponential backoff `(2^retry × initial)` with ±20% random jitter so
    /// that many clients retrying together do not hit the server in lockstep.
    ///
    /// # Arguments
    ///
    /// * `retry` - The retry attempt number (0-indexed, so first retry is 0)
    pub fn backoff(&self, retry: u32) -> Duration {
        let base_ms = self.initial_backoff.as_millis() as u64;
        let backoff_ms = base_ms.saturating_mul(2_u64.saturating_pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64).saturating_add(jitter).max(0) as u64)
    }

    /// Whether an error is worth another attempt.
    pub fn is_retryable(error: &EdgarError) -> bool {
        match error {
            EdgarError::RemoteRejected { status_code, .. } => {
                *status_code == 429 || *status_code >= 500
            }
            EdgarError::TransportFailure { .. } => true,
            _ => false,
        }
    }
}

/// A [`Fetch`] decorator that retries transient failures.
#[derive(Debug, Clone)]
pub struct Retrying<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F: Fetch> Retrying<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<F: Fetch> Fetch for Retrying<F> {
    async fn get(&self, url: &str, params: Option<&[(&str, &str)]>) -> Result<FetchResponse> {
        let mut retries = 0;

        loop {
            match self.inner.get(url, params).await {
                Ok(response) => return Ok(response),
                Err(err) if retries < self.policy.max_retries && RetryPolicy::is_retryable(&err) => {
                    let wait = self.policy.backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        err,
                        retries + 1,
                        self.policy.max_retries + 1,
                        wait
                    );
                    sleep(wait).await;
                    retries += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn user_agent(&self) -> &str {
        self.inner.user_agent()
    }

    fn urls(&self) -> &EdgarUrls {
        self.inner.urls()
    }
}
