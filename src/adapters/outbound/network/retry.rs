use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;

/// Longest error body echoed back in an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Retry behavior shared by the outbound HTTP clients.
///
/// Timeouts, connection errors, 429 and 5xx responses are retried with a
/// linear backoff (`base_delay * attempt`). A 429 additionally waits
/// `rate_limited_delay`. Other 4xx responses fail immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limited_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            rate_limited_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// No retries, for tests and one-shot calls
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            rate_limited_delay: Duration::ZERO,
        }
    }

    /// Sends the request built by `build` until it succeeds or the policy gives up.
    ///
    /// `build` is called once per attempt since a sent request is consumed.
    pub async fn send<F>(&self, service: &'static str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self.execute(service, build).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(VulnTrackError::external(service, describe(response).await).into())
    }

    /// Like [`send`](Self::send), but hands non-retryable error responses
    /// (4xx other than 429) back to the caller instead of failing.
    pub async fn execute<F>(&self, service: &'static str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            let (details, rate_limited) = match build().send().await {
                Ok(response) if !is_retryable(response.status()) => return Ok(response),
                Ok(response) => {
                    let rate_limited = response.status() == StatusCode::TOO_MANY_REQUESTS;
                    (describe(response).await, rate_limited)
                }
                Err(e) if e.is_timeout() || e.is_connect() => (e.to_string(), false),
                Err(e) => return Err(VulnTrackError::external(service, e.to_string()).into()),
            };

            tracing::debug!(
                service,
                attempt,
                max_attempts,
                error = %details,
                "Retryable request failure"
            );
            last_error = details;
            if attempt < max_attempts {
                let mut delay = self.base_delay * attempt;
                if rate_limited {
                    delay += self.rate_limited_delay;
                }
                tokio::time::sleep(delay).await;
            }
        }

        Err(VulnTrackError::external(
            service,
            format!("{} (after {} attempts)", last_error, max_attempts),
        )
        .into())
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// "status N: <body prefix>" for an unsuccessful response
pub async fn describe(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    format!("status {}: {}", status.as_u16(), snippet.trim())
}
