//! Webhook notification implementation.
//!
//! Posts each notification as a single embed block with a title, a colour
//! chosen by severity, and a timestamp.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::Notifier;
use crate::config::NotifierCfg;
use crate::shared::errors::{AppError, NotifyError};
use crate::shared::types::Notification;

#[derive(Debug, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub footer: EmbedFooter,
}

#[derive(Debug, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl WebhookPayload {
    pub fn build(username: &str, n: &Notification, at: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            embeds: vec![Embed {
                title: n.title.clone(),
                description: n.message.clone(),
                color: n.severity.color(),
                timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
                footer: EmbedFooter {
                    text: format!("hotelwatch · {:?}", n.severity).to_lowercase(),
                },
            }],
        }
    }
}

/// Posts notifications to an incoming webhook
pub struct WebhookNotifier {
    http_client: Client,
    url: String,
    username: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, cfg: &NotifierCfg) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;
        Ok(Self {
            http_client,
            url: url.into(),
            username: cfg.username.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = WebhookPayload::build(&self.username, notification, Utc::now());

        let response = self.http_client.post(&self.url).json(&payload).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NotifyError::RateLimited);
        }
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}
