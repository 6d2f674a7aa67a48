//! Outbound notifications

pub mod dispatcher;
pub mod webhook_notifier;

pub use dispatcher::NotificationDispatcher;
pub use webhook_notifier::WebhookNotifier;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::shared::errors::NotifyError;
use crate::shared::types::{Notification, Severity};

/// Delivers a single notification
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
        match n.severity {
            Severity::Info => info!("📣 {}: {}", n.title, n.message),
            Severity::Alert => warn!("🔔 {}: {}", n.title, n.message),
            Severity::Error => error!("🚨 {}: {}", n.title, n.message),
        }
        Ok(())
    }
}
