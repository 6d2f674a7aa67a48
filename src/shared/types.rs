//! Common types used across the application

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key into the price history: one hotel on one night.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StayKey {
    pub hotel_code: String,
    pub date: NaiveDate,
}

impl StayKey {
    pub fn new(hotel_code: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            hotel_code: hotel_code.into(),
            date,
        }
    }
}

/// A single hotel price seen in one availability fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub hotel_code: String,
    pub date: NaiveDate,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub status: String,
}

impl PriceObservation {
    pub fn is_open(&self) -> bool {
        self.status.eq_ignore_ascii_case("open")
    }

    /// The minimum price, if it is a usable positive number.
    pub fn valid_min_price(&self) -> Option<f64> {
        self.min_price.filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn key(&self) -> StayKey {
        StayKey::new(self.hotel_code.clone(), self.date)
    }
}

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Alert,
    Error,
}

impl Severity {
    /// Embed colour used by the webhook payload.
    pub fn color(&self) -> u32 {
        match self {
            Severity::Info => 0x3498DB,
            Severity::Alert => 0x2ECC71,
            Severity::Error => 0xE74C3C,
        }
    }
}

/// Outbound message handed to a notifier
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Info)
    }

    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Alert)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }
}
