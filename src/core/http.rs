//! JSON-over-HTTP transport shared by the provider clients.

use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::error::LlmError;

/// Timeout and retry policy for outbound requests.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    /// Total time allowed for a single attempt, body included.
    pub timeout: Duration,
    /// Extra attempts after a transient failure. `0` means fail fast.
    pub max_retries: u32,
    /// Base duration for exponential backoff
    pub initial_retry_delay: Duration,
    /// Cap on the backoff duration
    pub max_retry_delay: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 0,
            initial_retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(10),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry number `attempt + 1`, with +/- 10% jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_retry_delay.as_millis() as f64 * 2_f64.powi(attempt as i32);
        let jitter_factor = rand::random::<f64>() * 0.2 + 0.9;
        Duration::from_millis((base_delay * jitter_factor) as u64).min(self.max_retry_delay)
    }
}

pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
    user_agent: String,
}

impl HttpClient {
    /// Creating the client performs no I/O.
    pub fn new(config: HttpClientConfig, user_agent: Option<&str>) -> Self {
        let user_agent = user_agent
            .map(str::to_string)
            .unwrap_or_else(|| format!("textgen/{}", env!("CARGO_PKG_VERSION")));

        Self {
            client: reqwest::Client::new(),
            config,
            user_agent,
        }
    }

    /// POST `body` as JSON and decode a `200 OK` body into `Res`.
    ///
    /// Only transport failures, 429 and 5xx are retried, and only when
    /// `max_retries` is non-zero.
    #[tracing::instrument(
        name = "http_post_json",
        skip(self, body),
        fields(url = %url),
        err
    )]
    pub async fn post_json<Req, Res>(&self, url: &str, body: &Req) -> Result<Res, LlmError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| {
            LlmError::InvalidRequest(format!("Failed to serialize request body: {e}"))
        })?;

        let mut attempt = 0;
        loop {
            match self.send_once(url, &payload).await {
                Ok(res) => return Ok(res),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    warn!(attempt, error = %e, ?delay, "Request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<Res>(&self, url: &str, payload: &[u8]) -> Result<Res, LlmError>
    where
        Res: DeserializeOwned,
    {
        let res = self
            .client
            .post(url)
            .timeout(self.config.timeout)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, &self.user_agent)
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| transport_error(e, url, self.config.timeout))?;

        let status = res.status();
        // Must be read before `text()` consumes the response.
        let reason = reason_phrase(&res);
        let response_text = res
            .text()
            .await
            .map_err(|e| transport_error(e, url, self.config.timeout))?;

        if status != StatusCode::OK {
            warn!(status = %status, "Upstream returned error status");
            return Err(LlmError::UpstreamRequest {
                status_code: status.as_u16(),
                reason,
                body: response_text,
            });
        }

        debug!(status = %status, bytes = response_text.len(), "HTTP request successful");
        tracing::trace!(body = %response_text, "Upstream response body");

        serde_json::from_str(&response_text).map_err(|e| LlmError::MalformedResponse {
            message: format!("Failed to parse response body: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

/// The server's own reason phrase, or the canonical one for the status.
///
/// hyper only records the phrase when it differs from the canonical text.
fn reason_phrase(res: &reqwest::Response) -> String {
    match res.extensions().get::<hyper::ext::ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => res.status().canonical_reason().unwrap_or_default().to_string(),
    }
}

fn transport_error(e: reqwest::Error, url: &str, timeout: Duration) -> LlmError {
    let message = if e.is_timeout() {
        format!("Request to {url} timed out after {timeout:?}")
    } else if e.is_connect() {
        format!("Failed to connect to {url}")
    } else {
        format!("Request to {url} failed")
    };

    LlmError::Transport {
        message,
        source: Box::new(e),
    }
}
