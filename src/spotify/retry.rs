//! # Retry Policy
//!
//! Rate-limit handling for catalog calls, kept as a plain value so the
//! arithmetic can be tested without a network.
//!
//! A call is expressed as a closure returning [`Attempt`]: either the decoded
//! payload or a rate-limit signal carrying the advisory `Retry-After` delay.
//! [`RetryPolicy::execute`] drives the closure until it yields a value, fails
//! with a non-retryable error, or runs out of retries.
//!
//! ## Backoff
//!
//! | Situation | Delay before retry `n` |
//! |---|---|
//! | `Retry-After: s` sent | `min(s, max_retry_after)` |
//! | no header | `base_delay * n` |

use std::{future::Future, time::Duration};

use reqwest::{StatusCode, header::HeaderMap};
use tokio::time::sleep;

use crate::{
    error::{Result, SyncError},
    warning,
};

/// Result of a single attempt against a rate-limited endpoint.
#[derive(Debug)]
pub enum Attempt<T> {
    Done(T),
    /// HTTP 429, carrying the advisory `Retry-After` delay when present.
    RateLimited(Option<Duration>),
}

/// How often and how long to wait when the catalog answers 429.
///
/// Only rate-limit responses are retried. Every other failure propagates on
/// the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; the first attempt is not counted.
    pub max_retries: u32,
    /// Linear backoff step used when no `Retry-After` header is sent.
    pub base_delay: Duration,
    /// Upper bound for an advisory `Retry-After` delay.
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Delay before retry number `retry` (starting at 1).
    pub fn backoff(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(advised) => advised.min(self.max_retry_after),
            None => self.base_delay * retry,
        }
    }

    /// Runs `op` until it yields a value, fails, or the retry budget is spent.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Label of the called endpoint, used in log lines and in
    ///   the exhaustion error
    /// * `op` - Performs one attempt; called again after every rate-limited
    ///   answer
    ///
    /// # Returns
    ///
    /// - `Ok(T)` - The payload of the first attempt that was not rate limited
    /// - `Err(SyncError)` - The error of the first failing attempt, or
    ///   exhaustion
    ///
    /// # Errors
    ///
    /// - Any error returned by `op` is propagated at once, without a retry
    /// - A rate-limited final attempt ends in [`SyncError::ExhaustedRetries`],
    ///   never in a silent return
    ///
    /// # Example
    ///
    /// ```
    /// let policy = RetryPolicy::default();
    /// let album = policy
    ///     .execute("/albums/4aawyAB9vmqN3uQ7FjRGTy", || async {
    ///         let response = client.get(&url).bearer_auth(&token).send().await?;
    ///         if response.status() == StatusCode::TOO_MANY_REQUESTS {
    ///             return Ok(Attempt::RateLimited(retry_after(response.headers())));
    ///         }
    ///         Ok(Attempt::Done(response.json::<Album>().await?))
    ///     })
    ///     .await?;
    /// ```
    pub async fn execute<T, F, Fut>(&self, endpoint: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>>>,
    {
        let mut retry = 0;
        loop {
            match op().await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::RateLimited(retry_after) => {
                    retry += 1;
                    if retry > self.max_retries {
                        return Err(SyncError::ExhaustedRetries {
                            endpoint: endpoint.to_string(),
                        });
                    }

                    if let Some(advised) = retry_after {
                        if advised > self.max_retry_after {
                            warning!(
                                "Retry after has reached an abnormal high of {} seconds, waiting {} seconds instead.",
                                advised.as_secs(),
                                self.max_retry_after.as_secs()
                            );
                        }
                    }

                    let delay = self.backoff(retry, retry_after);
                    warning!(
                        "Rate limited on {} (retry {}/{}), waiting {:?}",
                        endpoint,
                        retry,
                        self.max_retries,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Reads the `Retry-After` header as whole seconds.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
