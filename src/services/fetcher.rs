use std::time::Duration;
use tracing::debug;

use crate::error::{AppError, Result};

/// Fetch timeout matching the source site's typical response window
const FETCH_TIMEOUT_SECS: u64 = 20;

/// Event page fetcher.
///
/// Sends browser-shaped headers with the configured User-Agent. Any
/// failure (connect error, timeout, non-2xx status) maps to
/// `AppError::Network`; the caller treats it as "skip this cycle."
pub struct EventFetcher {
    client: reqwest::Client,
    event_url: String,
    user_agent: String,
}

impl EventFetcher {
    pub fn new(event_url: &str, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            event_url: event_url.to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    /// Fetch the event page markup
    pub async fn fetch(&self) -> Result<String> {
        debug!(url = %self.event_url, "Fetching event page");

        let response = self
            .client
            .get(&self.event_url)
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Connection", "keep-alive")
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {}", e)))?;

        let response = response
            .error_for_status()
            .map_err(|e| AppError::Network(format!("Bad response status: {}", e)))?;

        response
            .text()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read response body: {}", e)))
    }
}
