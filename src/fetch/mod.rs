//! HTTP fetching for the cloner
//!
//! This module handles all network retrieval:
//! - building the reqwest client with a proper user agent and timeouts
//! - pacing: a mandatory minimum wall-clock delay between successive
//!   requests to the target, the run's politeness mechanism
//! - error classification into the per-item failure taxonomy

use crate::{MirrorError, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// A fetched response body with the metadata the core cares about.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// Final URL after redirects.
    pub final_url: Url,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header value (empty string when absent).
    pub content_type: String,
    /// Raw body bytes.
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Whether the response declared an HTML content type.
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
            || self.content_type.contains("application/xhtml")
    }

    /// The body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Builds the HTTP client used for the whole run.
pub fn build_http_client(user_agent: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// An HTTP client that enforces the configured inter-request delay.
///
/// Every network operation in the run (page fetches, sitemap fetches, API
/// calls, asset downloads) goes through this type, so the minimum spacing
/// holds across all of them. The delay gate is a mutex over the last request
/// instant; if fetches were ever parallelized, requests would still be spaced
/// out one at a time.
pub struct PoliteClient {
    client: Client,
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl PoliteClient {
    pub fn new(client: Client, delay: Duration) -> Self {
        Self {
            client,
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// Builds a client from a user agent and delay in one step.
    pub fn build(user_agent: &str, delay_ms: u64) -> std::result::Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(user_agent)?,
            Duration::from_millis(delay_ms),
        ))
    }

    /// Sleeps until at least `delay` has passed since the previous request.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Fetches a URL, returning the body on any 2xx response.
    ///
    /// Non-2xx statuses and transport failures are classified into
    /// [`MirrorError`] variants; the caller records them per item and
    /// continues; nothing here retries.
    pub async fn get(&self, url: &Url) -> Result<FetchedBody> {
        self.pace().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(url, e))?
            .to_vec();

        Ok(FetchedBody {
            final_url,
            status: status.as_u16(),
            content_type,
            bytes,
        })
    }

    /// Fetches a URL and requires an HTML response.
    pub async fn get_html(&self, url: &Url) -> Result<FetchedBody> {
        let body = self.get(url).await?;
        if !body.is_html() {
            return Err(MirrorError::Parse {
                url: url.to_string(),
                message: format!("expected HTML, got {}", body.content_type),
            });
        }
        Ok(body)
    }
}

fn classify_transport_error(url: &Url, error: reqwest::Error) -> MirrorError {
    if error.is_timeout() {
        MirrorError::Timeout {
            url: url.to_string(),
        }
    } else {
        MirrorError::Fetch {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("test-agent/1.0").is_ok());
    }

    #[test]
    fn test_is_html() {
        let body = FetchedBody {
            final_url: Url::parse("https://example.com/").unwrap(),
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            bytes: vec![],
        };
        assert!(body.is_html());

        let body = FetchedBody {
            content_type: "application/pdf".to_string(),
            ..body
        };
        assert!(!body.is_html());
    }

    #[tokio::test]
    async fn test_pacing_spaces_requests() {
        let client = PoliteClient::new(
            build_http_client("test-agent/1.0").unwrap(),
            Duration::from_millis(50),
        );

        let start = Instant::now();
        client.pace().await;
        client.pace().await;
        client.pace().await;

        // Two gaps of >= 50ms between three paced calls.
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_sleep() {
        let client = PoliteClient::new(
            build_http_client("test-agent/1.0").unwrap(),
            Duration::ZERO,
        );

        let start = Instant::now();
        for _ in 0..10 {
            client.pace().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
