//! Background delivery of notifications.
//!
//! Callers hand notifications to [`NotificationDispatcher::dispatch`] and move
//! on. A single task delivers them in order. When the remote side rate limits,
//! the task waits out the cooldown and puts the message at the back of the
//! queue. Queued messages live only in memory.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::Notifier;
use crate::shared::errors::NotifyError;
use crate::shared::types::Notification;

#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationDispatcher {
    /// Start the delivery task. It runs until every dispatcher clone is dropped
    /// and the queue is empty, or until the handle is aborted.
    ///
    /// Once the last clone is dropped the task keeps delivering for at most
    /// `drain_timeout`; whatever is still queued after that is logged and
    /// abandoned.
    pub fn spawn(
        notifier: Arc<dyn Notifier>,
        cooldown: Duration,
        drain_timeout: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(deliver(notifier, cooldown, drain_timeout, rx));
        (Self { tx }, handle)
    }

    pub fn dispatch(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification task has stopped; message dropped");
        }
    }
}

async fn deliver(
    notifier: Arc<dyn Notifier>,
    cooldown: Duration,
    drain_timeout: Duration,
    mut rx: mpsc::UnboundedReceiver<Notification>,
) {
    let mut pending: VecDeque<Notification> = VecDeque::new();
    let mut closed_at: Option<Instant> = None;

    loop {
        loop {
            match rx.try_recv() {
                Ok(n) => pending.push_back(n),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed_at.get_or_insert_with(Instant::now);
                    break;
                }
            }
        }

        if !pending.is_empty() && closed_at.is_some_and(|t| t.elapsed() >= drain_timeout) {
            let titles: Vec<&str> = pending.iter().map(|n| n.title.as_str()).collect();
            warn!(
                "🗑️ Abandoning {} queued notifications after {:?}: {}",
                pending.len(),
                drain_timeout,
                titles.join(", ")
            );
            break;
        }

        let next = match pending.pop_front() {
            Some(n) => n,
            None => match rx.recv().await {
                Some(n) => n,
                None => break,
            },
        };

        match notifier.send(&next).await {
            Ok(()) => debug!("Delivered notification: {}", next.title),
            Err(NotifyError::RateLimited) => {
                let wait = match closed_at {
                    Some(t) => cooldown.min(drain_timeout.saturating_sub(t.elapsed())),
                    None => cooldown,
                };
                warn!("⏳ Webhook rate limited; requeueing '{}' after {:?}", next.title, wait);
                tokio::time::sleep(wait).await;
                pending.push_back(next);
            }
            Err(e) => error!("❌ Failed to deliver '{}': {}", next.title, e),
        }
    }

    debug!("Notification task finished");
}
