use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::error::DiscordError;

/// How rate-limited and failed requests are retried.
///
/// The wait after a 429 is whatever the server asks for in `Retry-After`,
/// or [`default_wait`](Self::default_wait) when it does not say. There is no
/// backoff growth and no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Wait used when a 429 carries no usable `Retry-After` header.
    pub default_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Wait requested by a rate-limited response.
    pub fn wait_hint(&self, headers: &HeaderMap) -> Duration {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .unwrap_or(self.default_wait)
    }

    /// Send the request built by `make`, retrying on 429 and on transport
    /// errors.
    ///
    /// `make` is called once per attempt because multipart bodies cannot be
    /// cloned. Any response other than 429 is returned as-is, error statuses
    /// included. A transport error on the last attempt is propagated; a 429
    /// on the last attempt becomes [`DiscordError::RateLimited`].
    pub async fn send<F>(&self, mut make: F) -> Result<Response, DiscordError>
    where
        F: FnMut() -> Result<RequestBuilder, DiscordError>,
    {
        let attempts = self.max_attempts.max(1);
        for attempt in 1..=attempts {
            let last = attempt == attempts;
            match make()?.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if last {
                        warn!(attempt, "Discord API rate limit hit, giving up");
                        return Err(DiscordError::RateLimited);
                    }
                    let wait = self.wait_hint(response.headers());
                    warn!(attempt, ?wait, "Discord API rate limit hit");
                    tokio::time::sleep(wait).await;
                }
                Ok(response) => return Ok(response),
                Err(e) if last => return Err(DiscordError::Http(e)),
                Err(e) => {
                    debug!(attempt, error = %e, "request failed, retrying");
                }
            }
        }
        Err(DiscordError::RateLimited)
    }
}
