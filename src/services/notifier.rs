use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::utils::format_usd;

const NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Context fields attached to every alert
#[derive(Debug, Clone, Default)]
pub struct NotifyContext {
    pub event_url: String,
    pub lowest_price: Option<f64>,
    pub median_sale: Option<f64>,
    pub num_listings: Option<usize>,
}

/// Alert delivery.
///
/// Sends to a Slack incoming webhook when `SLACK_WEBHOOK_URL` is set,
/// falling back to console output otherwise or when delivery fails.
/// Delivery failure is logged and swallowed; it never reaches the caller.
pub struct Notifier {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new() -> Self {
        let webhook_url = std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            webhook_url,
            client,
        }
    }

    /// Deliver an alert with its context
    pub async fn notify(&self, message: &str, context: &NotifyContext) {
        if let Some(url) = &self.webhook_url {
            match self.post_slack(url, message, context).await {
                Ok(()) => return,
                Err(e) => error!(error = %e, "Failed to send Slack alert"),
            }
        }
        print_console_alert(message, context);
    }

    async fn post_slack(
        &self,
        webhook_url: &str,
        message: &str,
        context: &NotifyContext,
    ) -> Result<()> {
        let payload = slack_payload(message, context);

        let response = self
            .client
            .post(webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notify(format!("Slack request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Notify(format!(
                "Slack webhook returned {}",
                response.status()
            )));
        }

        info!("Sent Slack alert");
        Ok(())
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Block Kit payload: the message as a section block plus a context block
/// carrying the event link and current market fields
fn slack_payload(message: &str, context: &NotifyContext) -> Value {
    let listings = context
        .num_listings
        .map(|n| n.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    json!({
        "text": message,
        "blocks": [
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": message }
            },
            {
                "type": "context",
                "elements": [
                    { "type": "mrkdwn", "text": format!("*Event:* <{}>", context.event_url) },
                    { "type": "mrkdwn", "text": format!("*Lowest:* {}", format_usd(context.lowest_price)) },
                    { "type": "mrkdwn", "text": format!("*Median:* {}", format_usd(context.median_sale)) },
                    { "type": "mrkdwn", "text": format!("*Listings:* {}", listings) }
                ]
            }
        ]
    })
}

fn print_console_alert(message: &str, context: &NotifyContext) {
    println!("\n=== ALERT ===");
    println!("{}", message);
    println!(
        "event={} | lowest={} | median={} | listings={}",
        context.event_url,
        format_usd(context.lowest_price),
        format_usd(context.median_sale),
        context
            .num_listings
            .map(|n| n.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!("=============\n");
}
