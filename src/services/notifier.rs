// src/services/notifier.rs

//! Webhook notifier.
//!
//! Posts one alert per new announcement to a Slack-compatible incoming
//! webhook.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Announcement, NotifierConfig, WebhookMessage};

/// Delivers an alert for a single announcement.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, item: &Announcement) -> Result<()>;
}

/// Posts JSON alerts to a webhook URL.
pub struct WebhookNotifier {
    client: Client,
    config: NotifierConfig,
}

impl WebhookNotifier {
    pub fn new(client: Client, config: NotifierConfig) -> Self {
        Self { client, config }
    }

    /// Payload that would be sent for `item`.
    pub fn message(&self, item: &Announcement) -> WebhookMessage {
        WebhookMessage::for_announcement(item, &self.config)
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, item: &Announcement) -> Result<()> {
        let message = self.message(item);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::notify(&item.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify(
                &item.id,
                format!("webhook returned {status}: {}", body.trim()),
            ));
        }

        log::info!("Sent alert for {}", item.id);
        Ok(())
    }
}
