//! Threshold and price-drop evaluation

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{AlertKind, ExclusionRules, PriceAlert, PriceHistory, ThresholdOverrides};
use crate::config::Config;
use crate::domain::availability::AvailabilityPayload;
use crate::shared::types::PriceObservation;

/// Result of evaluating one payload
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub alerts: Vec<PriceAlert>,
    /// Observations that passed every filter and were recorded
    pub evaluated: usize,
    /// Configured dates with missing or malformed data
    pub skipped_dates: Vec<NaiveDate>,
}

impl EvaluationOutcome {
    pub fn count(&self, kind: AlertKind) -> usize {
        self.alerts.iter().filter(|a| a.kind == kind).count()
    }
}

/// Applies exclusion rules, thresholds and history comparison to observations
#[derive(Debug, Clone)]
pub struct PriceEvaluator {
    threshold: f64,
    exclusions: ExclusionRules,
    overrides: ThresholdOverrides,
    drop_alerts: bool,
}

impl PriceEvaluator {
    pub fn new(threshold: f64, exclusions: ExclusionRules, overrides: ThresholdOverrides) -> Self {
        Self {
            threshold,
            exclusions,
            overrides,
            drop_alerts: true,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.monitor.price_threshold,
            ExclusionRules::from(&cfg.exclusions),
            ThresholdOverrides::from(cfg.overrides.as_slice()),
        )
        .with_drop_alerts(cfg.features.price_drop_alerts)
    }

    pub fn with_drop_alerts(mut self, enabled: bool) -> Self {
        self.drop_alerts = enabled;
        self
    }

    /// Evaluate every hotel under each of `dates`. Dates that are missing or
    /// malformed are skipped without affecting the rest.
    pub fn evaluate(
        &self,
        payload: &AvailabilityPayload,
        dates: &[NaiveDate],
        history: &mut PriceHistory,
    ) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();

        for &date in dates {
            let observations = match payload.observations_for(date) {
                Ok(obs) => obs,
                Err(e) => {
                    warn!("Skipping date: {}", e);
                    outcome.skipped_dates.push(date);
                    continue;
                }
            };

            for obs in &observations {
                if let Some(alerts) = self.evaluate_observation(obs, history) {
                    outcome.evaluated += 1;
                    outcome.alerts.extend(alerts);
                }
            }
        }

        outcome
    }

    /// Returns `None` when the observation is filtered out, otherwise the
    /// alerts it raised (possibly none). History is updated in the latter case.
    pub fn evaluate_observation(
        &self,
        obs: &PriceObservation,
        history: &mut PriceHistory,
    ) -> Option<Vec<PriceAlert>> {
        if !obs.is_open() {
            return None;
        }

        let override_threshold = self.overrides.lookup(&obs.hotel_code, obs.date);
        if override_threshold.is_none() && self.exclusions.is_excluded(&obs.hotel_code) {
            debug!(hotel = %obs.hotel_code, date = %obs.date, "Excluded");
            return None;
        }

        let price = obs.valid_min_price()?;
        let mut alerts = Vec::new();

        let (threshold, kind) = match override_threshold {
            Some(t) => (t, AlertKind::OverrideThreshold),
            None => (self.threshold, AlertKind::Threshold),
        };
        if price < threshold {
            alerts.push(PriceAlert {
                kind,
                hotel_code: obs.hotel_code.clone(),
                date: obs.date,
                price,
                threshold: Some(threshold),
                previous_price: None,
            });
        }

        let key = obs.key();
        if self.drop_alerts {
            if let Some(previous) = history.get(&key).filter(|prev| price < *prev) {
                alerts.push(PriceAlert {
                    kind: AlertKind::PriceDrop,
                    hotel_code: obs.hotel_code.clone(),
                    date: obs.date,
                    price,
                    threshold: None,
                    previous_price: Some(previous),
                });
            }
        }

        history.record(key, price);
        Some(alerts)
    }
}
