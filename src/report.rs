// src/report.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::price::{AlertKind, EvaluationOutcome};
use crate::shared::utils::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    Completed,
    FetchFailed,
    /// Another cycle was still running
    Skipped,
}

/// Summary of one check cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: String,
    pub status: CycleStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub dates_checked: usize,
    pub observations_evaluated: usize,
    pub threshold_alerts: usize,
    pub override_alerts: usize,
    pub drop_alerts: usize,
    pub skipped_dates: Vec<NaiveDate>,

    pub error: Option<String>,
}

impl CycleReport {
    pub fn new(status: CycleStatus, started_at: DateTime<Utc>) -> Self {
        Self {
            cycle_id: generate_id(),
            status,
            started_at,
            finished_at: started_at,
            dates_checked: 0,
            observations_evaluated: 0,
            threshold_alerts: 0,
            override_alerts: 0,
            drop_alerts: 0,
            skipped_dates: Vec::new(),
            error: None,
        }
    }

    pub fn skipped() -> Self {
        Self::new(CycleStatus::Skipped, Utc::now())
    }

    pub fn fetch_failed(started_at: DateTime<Utc>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(CycleStatus::FetchFailed, started_at)
        }
        .finish()
    }

    pub fn completed(
        started_at: DateTime<Utc>,
        dates_checked: usize,
        outcome: &EvaluationOutcome,
    ) -> Self {
        Self {
            dates_checked,
            observations_evaluated: outcome.evaluated,
            threshold_alerts: outcome.count(AlertKind::Threshold),
            override_alerts: outcome.count(AlertKind::OverrideThreshold),
            drop_alerts: outcome.count(AlertKind::PriceDrop),
            skipped_dates: outcome.skipped_dates.clone(),
            ..Self::new(CycleStatus::Completed, started_at)
        }
        .finish()
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn total_alerts(&self) -> usize {
        self.threshold_alerts + self.override_alerts + self.drop_alerts
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
