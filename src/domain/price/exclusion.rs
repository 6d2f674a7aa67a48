//! Exclusion rules and per-stay threshold overrides

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::config::{ExclusionsCfg, OverrideCfg};
use crate::shared::types::StayKey;

/// Hotel codes and code suffixes that are never alerted on
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    codes: BTreeSet<String>,
    suffixes: BTreeSet<String>,
}

impl ExclusionRules {
    pub fn new<C, S>(codes: C, suffixes: S) -> Self
    where
        C: IntoIterator<Item = String>,
        S: IntoIterator<Item = String>,
    {
        Self {
            codes: codes.into_iter().collect(),
            // an empty suffix would match every code
            suffixes: suffixes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    pub fn is_excluded(&self, hotel_code: &str) -> bool {
        self.codes.contains(hotel_code)
            || self.suffixes.iter().any(|s| hotel_code.ends_with(s.as_str()))
    }
}

impl From<&ExclusionsCfg> for ExclusionRules {
    fn from(cfg: &ExclusionsCfg) -> Self {
        Self::new(cfg.hotel_codes.iter().cloned(), cfg.suffixes.iter().cloned())
    }
}

/// Thresholds that replace the global one for specific (hotel, date) pairs.
/// A matching override also lifts any exclusion for that pair.
#[derive(Debug, Clone, Default)]
pub struct ThresholdOverrides {
    table: HashMap<StayKey, f64>,
}

impl ThresholdOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hotel_code: impl Into<String>, date: NaiveDate, threshold: f64) {
        self.table.insert(StayKey::new(hotel_code, date), threshold);
    }

    pub fn lookup(&self, hotel_code: &str, date: NaiveDate) -> Option<f64> {
        self.table.get(&StayKey::new(hotel_code, date)).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl From<&[OverrideCfg]> for ThresholdOverrides {
    fn from(entries: &[OverrideCfg]) -> Self {
        let mut overrides = Self::new();
        for o in entries {
            overrides.insert(o.hotel_code.clone(), o.date, o.threshold);
        }
        overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ExclusionRules {
        ExclusionRules::new(
            vec!["YLCL".to_string(), "YLAB".to_string()],
            vec!["-HS".to_string(), "".to_string()],
        )
    }

    #[test]
    fn test_exact_code_is_excluded() {
        assert!(rules().is_excluded("YLCL"));
        assert!(!rules().is_excluded("YLCLX"));
    }

    #[test]
    fn test_suffix_is_excluded() {
        assert!(rules().is_excluded("YLXX-HS"));
        assert!(!rules().is_excluded("HS-YLXX"));
    }

    #[test]
    fn test_empty_suffix_is_ignored() {
        assert!(!rules().is_excluded("YLXX"));
    }

    #[test]
    fn test_override_lookup_is_per_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 28).unwrap();
        let cfg = vec![OverrideCfg {
            hotel_code: "YLCL".to_string(),
            date,
            threshold: 200.0,
        }];
        let overrides = ThresholdOverrides::from(cfg.as_slice());

        assert_eq!(overrides.lookup("YLCL", date), Some(200.0));
        assert_eq!(overrides.lookup("YLCL", date.succ_opt().unwrap()), None);
        assert_eq!(overrides.lookup("YLXX", date), None);
        assert_eq!(overrides.len(), 1);
    }
}
