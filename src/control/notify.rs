//! Notification sinks.
//!
//! `LogNotifier` writes through tracing only; `WebhookNotifier`
//! additionally posts to a configured webhook. Delivery failures are
//! swallowed: notifications are best-effort.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use super::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Notifier that only logs. Default when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        info!(notification = message, "Notification");
    }
}

/// Notifier that posts JSON to a webhook, falling back to the log on failure.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        // Client::builder only fails on TLS backend misconfiguration; fall
        // back to the default client rather than propagate.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) {
        info!(notification = message, "Notification");

        let result = self
            .client
            .post(&self.url)
            .json(&json!({ "message": message }))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        if let Err(e) = result {
            warn!(error = %e, "Webhook delivery failed (ignored)");
        }
    }
}
