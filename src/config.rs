use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fs, path::Path, time::Duration};

use crate::shared::errors::ConfigError;
use crate::shared::utils::date_range;

pub const DEFAULT_PRICE_THRESHOLD: f64 = 225.0;
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 30;
pub const DEFAULT_RANGE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorCfg {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_threshold: f64,
    pub check_interval_minutes: u64,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        let today = Local::now().date_naive();
        Self {
            start_date: today,
            end_date: today + ChronoDuration::days(DEFAULT_RANGE_DAYS - 1),
            price_threshold: DEFAULT_PRICE_THRESHOLD,
            check_interval_minutes: DEFAULT_CHECK_INTERVAL_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExclusionsCfg {
    pub hotel_codes: BTreeSet<String>,
    pub suffixes: BTreeSet<String>,
}

/// Threshold that applies to one hotel on one date instead of the global one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideCfg {
    pub hotel_code: String,
    pub date: NaiveDate,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Result limit sent with the query; defaults to the number of days in range.
    pub limit: Option<u32>,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self {
            base_url: "https://hotels.example.com/api/availability".to_string(),
            timeout_secs: 30,
            user_agent: format!("hotelwatch/{}", env!("CARGO_PKG_VERSION")),
            limit: None,
            max_attempts: 3,
            backoff_base_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierCfg {
    pub webhook_url: Option<String>,
    pub username: String,
    pub rate_limit_cooldown_secs: u64,
}

impl Default for NotifierCfg {
    fn default() -> Self {
        Self {
            webhook_url: None,
            username: "Hotel Watch".to_string(),
            rate_limit_cooldown_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesCfg {
    pub price_drop_alerts: bool,
    pub notify_on_start: bool,
    pub notify_on_errors: bool,
    pub dry_run: bool,
}

impl Default for FeaturesCfg {
    fn default() -> Self {
        Self {
            price_drop_alerts: true,
            notify_on_start: true,
            notify_on_errors: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorCfg,
    pub exclusions: ExclusionsCfg,
    pub overrides: Vec<OverrideCfg>,
    pub api: ApiCfg,
    pub notifier: NotifierCfg,
    pub features: FeaturesCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.end_date < self.monitor.start_date {
            return Err(ConfigError::Invalid(format!(
                "end_date {} is before start_date {}",
                self.monitor.end_date, self.monitor.start_date
            )));
        }
        if !(self.monitor.price_threshold.is_finite() && self.monitor.price_threshold > 0.0) {
            return Err(ConfigError::Invalid("price_threshold must be positive".to_string()));
        }
        let minutes = self.monitor.check_interval_minutes;
        if minutes == 0 {
            return Err(ConfigError::Invalid(
                "check_interval_minutes must be at least 1".to_string(),
            ));
        }
        if minutes.checked_mul(60).is_none() {
            return Err(ConfigError::Invalid(format!(
                "check_interval_minutes {} is too large",
                minutes
            )));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".to_string()));
        }
        if self.api.max_attempts == 0 {
            return Err(ConfigError::Invalid("api.max_attempts must be at least 1".to_string()));
        }
        for o in &self.overrides {
            if !(o.threshold.is_finite() && o.threshold > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "override threshold for {} on {} must be positive",
                    o.hotel_code, o.date
                )));
            }
        }
        Ok(())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        date_range(self.monitor.start_date, self.monitor.end_date)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.check_interval_minutes.saturating_mul(60))
    }

    pub fn request_limit(&self) -> u32 {
        self.api
            .limit
            .unwrap_or_else(|| self.dates().len().try_into().unwrap_or(u32::MAX))
    }
}
