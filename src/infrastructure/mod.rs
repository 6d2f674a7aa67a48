//! Infrastructure layer - HTTP clients for the availability API and webhook

pub mod api;
pub mod notification;

pub use api::{AvailabilityClient, AvailabilitySource, RetryPolicy};
pub use notification::{LogNotifier, NotificationDispatcher, Notifier, WebhookNotifier};
