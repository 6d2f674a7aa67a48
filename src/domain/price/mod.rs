//! Price domain - exclusion rules, price history and alert evaluation

mod exclusion;
mod price_evaluator;
mod price_history;

pub use exclusion::{ExclusionRules, ThresholdOverrides};
pub use price_evaluator::{EvaluationOutcome, PriceEvaluator};
pub use price_history::PriceHistory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::types::Notification;
use crate::shared::utils::format_price;

/// What kind of alert an observation produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Below the global threshold
    Threshold,
    /// Below a per-(hotel, date) override threshold
    OverrideThreshold,
    /// Lower than the last recorded price
    PriceDrop,
}

/// Alert raised for one (hotel, date) observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub kind: AlertKind,
    pub hotel_code: String,
    pub date: NaiveDate,
    pub price: f64,
    /// Threshold that was crossed, for threshold alerts
    pub threshold: Option<f64>,
    /// Previous price, for drop alerts
    pub previous_price: Option<f64>,
}

impl PriceAlert {
    /// `previous - current` for drop alerts
    pub fn savings(&self) -> Option<f64> {
        self.previous_price.map(|prev| prev - self.price)
    }

    pub fn to_notification(&self) -> Notification {
        match self.kind {
            AlertKind::Threshold => Notification::alert(
                format!("Low price: {} on {}", self.hotel_code, self.date),
                format!(
                    "{} is available on {} for {} (threshold {}).",
                    self.hotel_code,
                    self.date,
                    format_price(self.price),
                    format_price(self.threshold.unwrap_or_default()),
                ),
            ),
            AlertKind::OverrideThreshold => Notification::alert(
                format!("Watched stay: {} on {}", self.hotel_code, self.date),
                format!(
                    "{} on {} dropped to {}, under its watch price of {}.",
                    self.hotel_code,
                    self.date,
                    format_price(self.price),
                    format_price(self.threshold.unwrap_or_default()),
                ),
            ),
            AlertKind::PriceDrop => Notification::alert(
                format!("Price drop: {} on {}", self.hotel_code, self.date),
                format!(
                    "{} on {} fell from {} to {}, saving {}.",
                    self.hotel_code,
                    self.date,
                    format_price(self.previous_price.unwrap_or_default()),
                    format_price(self.price),
                    format_price(self.savings().unwrap_or_default()),
                ),
            ),
        }
    }
}
