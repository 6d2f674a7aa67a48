//! Availability domain - the payload returned by the hotel availability API

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::shared::types::PriceObservation;

/// Why a configured date produced no observations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DayError {
    #[error("no data for {0}")]
    Missing(NaiveDate),

    #[error("data for {date} is not a hotel map: {reason}")]
    Malformed { date: NaiveDate, reason: String },
}

/// One hotel's entry under a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelEntry {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub max: Option<f64>,
}

/// Prices arrive either as JSON numbers or numeric strings; anything else is absent.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Full availability response, keyed by `YYYY-MM-DD` then by hotel code.
///
/// Day values are kept raw so one malformed day never poisons the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityPayload {
    days: BTreeMap<String, Value>,
}

impl AvailabilityPayload {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Observations for a single date. Individual malformed hotel entries are
    /// logged and skipped.
    pub fn observations_for(&self, date: NaiveDate) -> Result<Vec<PriceObservation>, DayError> {
        let key = date.format("%Y-%m-%d").to_string();
        let day = self.days.get(&key).ok_or(DayError::Missing(date))?;

        let hotels = day.as_object().ok_or_else(|| DayError::Malformed {
            date,
            reason: format!("expected object, found {}", value_kind(day)),
        })?;

        let mut observations = Vec::with_capacity(hotels.len());
        for (code, raw) in hotels {
            match serde_json::from_value::<HotelEntry>(raw.clone()) {
                Ok(entry) => observations.push(PriceObservation {
                    hotel_code: code.clone(),
                    date,
                    min_price: entry.min,
                    max_price: entry.max,
                    status: entry.status,
                }),
                Err(e) => warn!(hotel = %code, %date, "Skipping malformed hotel entry: {}", e),
            }
        }
        Ok(observations)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
