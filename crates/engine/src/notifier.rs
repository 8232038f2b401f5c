//! User-facing notifications, injected into the console.
//!
//! The reconciler and dispatcher only return typed results; turning those
//! into messages and delivering them is the job of a [`Notifier`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use parkctl_core::types::ListingId;

/// Default capacity of the broadcast channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub listing_id: Option<ListingId>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            listing_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn for_listing(mut self, id: ListingId) -> Self {
        self.listing_id = Some(id);
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let listing_id = notification.listing_id.map(|id| id.to_string());
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(listing_id = listing_id.as_deref(), message = %notification.message, "Notification")
            }
            NotificationLevel::Error => {
                tracing::error!(listing_id = listing_id.as_deref(), message = %notification.message, "Notification")
            }
        }
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Fans notifications out to any number of subscribers over a
/// `tokio::sync::broadcast` channel. Share it via `Arc`.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        // No subscribers is not an error.
        let _ = self.sender.send(notification);
    }
}
