//! Best-effort webhook notifications.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use super::RemoteError;

/// Receives a message after something noteworthy happened.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `message`. Callers only log the error.
    async fn notify(&self, message: &str) -> Result<(), RemoteError>;
}

/// Posts `{"content": message}` to a chat webhook (Discord style).
#[derive(Clone, Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: Url,
}

impl WebhookNotifier {
    /// Notifier for the webhook at `url`.
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.url.clone())
            .json(&json!({ "content": message }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status, body));
        }
        debug!("Webhook notified ({status})");
        Ok(())
    }
}

/// Sends `message` on a detached task; failures are logged and dropped.
pub fn notify_in_background(notifier: Arc<dyn Notifier>, message: String) {
    tokio::spawn(async move {
        if let Err(err) = notifier.notify(&message).await {
            warn!("Notification failed: {err}");
        }
    });
}
