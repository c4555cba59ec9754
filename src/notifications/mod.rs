pub mod models;
pub mod senders;

pub use models::{Notification, Priority, PushoverConfig};
pub use senders::{pushover::PushoverSender, NotificationSender, SenderError};
