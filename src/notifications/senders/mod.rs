use async_trait::async_trait;
use thiserror::Error;

use super::models::Notification;

pub mod pushover;

#[derive(Error, Debug)]
pub enum SenderError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A trait for delivering notifications to a push service.
/// Implementations do not retry; failures are returned to the caller.
#[async_trait]
pub trait NotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), SenderError>;
}
