use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use super::{NotificationSender, SenderError};
use crate::notifications::models::{Notification, PushoverConfig};

pub const DEFAULT_API_URL: &str = "https://api.pushover.net/1/messages.json";
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A sender for pushing notifications via the Pushover messages API.
pub struct PushoverSender {
    client: Client,
    config: PushoverConfig,
}

impl PushoverSender {
    pub fn new(config: PushoverConfig) -> Result<Self, SenderError> {
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: PushoverConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Serialize)]
struct PushoverMessage<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
    priority: String,
}

#[async_trait]
impl NotificationSender for PushoverSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError> {
        let form = PushoverMessage {
            token: &self.config.token,
            user: &self.config.user,
            title: &notification.title,
            message: &notification.message,
            priority: notification.priority.to_string(),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .form(&form)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(SenderError::SendFailed(format!(
                "Pushover API returned non-success status: {status}. Body: {error_body}"
            )));
        }

        info!(title = %notification.title, priority = %notification.priority, "Notification delivered.");
        Ok(())
    }
}
