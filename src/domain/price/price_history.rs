//! Last-seen prices per hotel and date

use std::collections::HashMap;

use crate::shared::types::StayKey;

/// In-memory record of the last minimum price seen for each (hotel, date).
///
/// Entries are only ever inserted or overwritten, never removed.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    prices: HashMap<StayKey, f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StayKey) -> Option<f64> {
        self.prices.get(key).copied()
    }

    /// Store `price`, returning the value it replaced.
    pub fn record(&mut self, key: StayKey, price: f64) -> Option<f64> {
        self.prices.insert(key, price)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
