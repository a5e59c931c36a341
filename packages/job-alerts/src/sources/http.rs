//! Shared HTTP plumbing for network sources.
//!
//! Every request carries a timeout, the run's user agent, and waits on a
//! per-source rate limiter so consecutive requests to one board are spaced
//! out.

use governor::{Quota, RateLimiter};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::sync::Arc;
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::types::config::HttpSettings;

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Rate-limited HTTP client owned by one source.
pub struct HttpFetcher {
    client: reqwest::Client,
    limiter: Option<Arc<DefaultRateLimiter>>,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and request spacing.
    ///
    /// A zero `request_delay` disables spacing.
    pub fn new(settings: HttpSettings) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| SourceError::Http(Box::new(e)))?;

        let limiter = Quota::with_period(settings.request_delay)
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Ok(Self { client, limiter })
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Wait for the rate limiter before proceeding.
    async fn wait_for_permit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// GET a URL and return the body as text.
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, &str)],
        user_agent: &str,
    ) -> SourceResult<String> {
        self.wait_for_permit().await;
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .query(query)
            .header(USER_AGENT, user_agent)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))
    }

    /// GET a URL and parse the body as JSON.
    pub async fn get_json(&self, url: &str, user_agent: &str) -> SourceResult<serde_json::Value> {
        let body = self.get_text(url, &[], user_agent).await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
