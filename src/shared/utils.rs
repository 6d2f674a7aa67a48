//! Utility functions and helpers

use chrono::NaiveDate;

/// Every date from `start` to `end`, both inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Format a price for display
pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
