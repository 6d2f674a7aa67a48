use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::domain::price::{PriceEvaluator, PriceHistory};
use crate::infrastructure::api::{fetch_with_retry, AvailabilitySource, RetryPolicy};
use crate::infrastructure::notification::NotificationDispatcher;
use crate::report::CycleReport;
use crate::shared::types::{Notification, StayKey};
use crate::shared::utils::format_price;

/// Marks a cycle as running for as long as it is alive, including when the
/// cycle future is cancelled.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs check cycles: fetch, evaluate, notify
pub struct Monitor {
    source: Arc<dyn AvailabilitySource>,
    evaluator: PriceEvaluator,
    history: Mutex<PriceHistory>,
    dispatcher: NotificationDispatcher,
    dates: Vec<NaiveDate>,
    limit: u32,
    retry: RetryPolicy,
    notify_on_errors: bool,
    in_progress: AtomicBool,
}

impl Monitor {
    pub fn new(
        cfg: &Config,
        source: Arc<dyn AvailabilitySource>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            source,
            evaluator: PriceEvaluator::from_config(cfg),
            history: Mutex::new(PriceHistory::new()),
            dispatcher,
            dates: cfg.dates(),
            limit: cfg.request_limit(),
            retry: RetryPolicy::from_config(&cfg.api),
            notify_on_errors: cfg.features.notify_on_errors,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_cycle_running(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run one check cycle. Returns a skipped report when another cycle is
    /// still in progress.
    pub async fn run_cycle(&self) -> CycleReport {
        let Some(_guard) = CycleGuard::acquire(&self.in_progress) else {
            warn!("⏭️ Previous check cycle still running; skipping this trigger");
            return CycleReport::skipped();
        };

        let started_at = Utc::now();
        let Some(&start) = self.dates.first() else {
            warn!("No dates configured; nothing to check");
            return CycleReport::completed(started_at, 0, &Default::default());
        };

        info!("🔄 Checking {} dates starting {}", self.dates.len(), start);

        let fetched = fetch_with_retry(self.source.as_ref(), start, self.limit, self.retry).await;
        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                error!("❌ Availability fetch failed: {}", e);
                if self.notify_on_errors {
                    self.dispatcher
                        .dispatch(Notification::error("Availability check failed", e.to_string()));
                }
                return CycleReport::fetch_failed(started_at, &e);
            }
        };

        let outcome = {
            let mut history = self.history.lock().await;
            self.evaluator.evaluate(&payload, &self.dates, &mut history)
        };

        for alert in &outcome.alerts {
            info!(
                hotel = %alert.hotel_code,
                date = %alert.date,
                kind = ?alert.kind,
                "🔔 {}",
                format_price(alert.price)
            );
            self.dispatcher.dispatch(alert.to_notification());
        }

        let report = CycleReport::completed(started_at, self.dates.len(), &outcome);
        info!(
            "✅ Cycle complete: {} evaluated, {} alerts, {} dates skipped",
            report.observations_evaluated,
            report.total_alerts(),
            report.skipped_dates.len()
        );
        if let Ok(json) = report.to_json() {
            debug!("Cycle report: {}", json);
        }
        report
    }

    pub async fn recorded_price(&self, hotel_code: &str, date: NaiveDate) -> Option<f64> {
        self.history.lock().await.get(&StayKey::new(hotel_code, date))
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::OverrideCfg;
    use crate::domain::availability::AvailabilityPayload;
    use crate::infrastructure::notification::Notifier;
    use crate::report::CycleStatus;
    use crate::shared::errors::{FetchError, NotifyError};
    use crate::shared::types::Severity;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicU32;
    use std::time::{Duration, Instant};
    use tokio::task::JoinHandle;

    /// Serves queued payloads in order; `None` entries time out.
    pub(crate) struct FakeSource {
        responses: std::sync::Mutex<Vec<Option<Value>>>,
        delay: Duration,
        pub(crate) calls: AtomicU32,
        pub(crate) starts: std::sync::Mutex<Vec<Instant>>,
    }

    impl FakeSource {
        pub(crate) fn new(mut responses: Vec<Option<Value>>) -> Self {
            responses.reverse();
            Self {
                responses: std::sync::Mutex::new(responses),
                delay: Duration::ZERO,
                calls: AtomicU32::new(0),
                starts: std::sync::Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl AvailabilitySource for FakeSource {
        async fn fetch(
            &self,
            _start: NaiveDate,
            _limit: u32,
        ) -> Result<AvailabilityPayload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.starts.lock().unwrap().push(Instant::now());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let next = self.responses.lock().unwrap().pop().flatten();
            match next {
                Some(v) => Ok(AvailabilityPayload::from_value(v).unwrap()),
                None => Err(FetchError::Timeout),
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, n: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().await.push(n.clone());
            Ok(())
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub(crate) fn test_config() -> Config {
        let mut cfg = Config::default();
        cfg.monitor.start_date = d(2025, 6, 27);
        cfg.monitor.end_date = d(2025, 7, 2);
        cfg.monitor.price_threshold = 225.0;
        cfg.exclusions.hotel_codes.insert("YLCL".to_string());
        cfg.overrides.push(OverrideCfg {
            hotel_code: "YLCL".to_string(),
            date: d(2025, 6, 28),
            threshold: 200.0,
        });
        cfg
    }

    fn build(
        cfg: &Config,
        source: FakeSource,
    ) -> (Monitor, Arc<FakeSource>, Arc<RecordingNotifier>, JoinHandle<()>) {
        let source = Arc::new(source);
        let notifier = Arc::new(RecordingNotifier::default());
        let (dispatcher, handle) = NotificationDispatcher::spawn(
            notifier.clone(),
            Duration::from_millis(1),
            Duration::from_secs(1),
        );
        let monitor = Monitor::new(cfg, source.clone(), dispatcher)
            .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(1)));
        (monitor, source, notifier, handle)
    }

    #[tokio::test]
    async fn test_threshold_alert_scenario() {
        let payload = json!({
            "2025-06-30": { "YLXX": { "status": "open", "min": 180, "max": 250 } }
        });
        let (monitor, _source, notifier, handle) =
            build(&test_config(), FakeSource::new(vec![Some(payload)]));

        let report = monitor.run_cycle().await;
        assert_eq!(report.status, CycleStatus::Completed);
        assert_eq!(report.threshold_alerts, 1);
        assert_eq!(monitor.recorded_price("YLXX", d(2025, 6, 30)).await, Some(180.0));

        drop(monitor);
        handle.await.unwrap();
        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Alert);
    }

    #[tokio::test]
    async fn test_drop_alert_across_cycles() {
        let mut cfg = test_config();
        cfg.exclusions.hotel_codes.clear();
        cfg.overrides.clear();
        let first = json!({ "2025-06-28": { "YLCL": { "status": "open", "min": 452.61 } } });
        let second = json!({ "2025-06-28": { "YLCL": { "status": "open", "min": "420.00" } } });
        let (monitor, _source, notifier, handle) =
            build(&cfg, FakeSource::new(vec![Some(first), Some(second)]));

        let baseline = monitor.run_cycle().await;
        assert_eq!(baseline.total_alerts(), 0);
        assert_eq!(monitor.recorded_price("YLCL", d(2025, 6, 28)).await, Some(452.61));

        let report = monitor.run_cycle().await;
        assert_eq!(report.drop_alerts, 1);
        assert_eq!(report.threshold_alerts, 0);
        assert_eq!(monitor.recorded_price("YLCL", d(2025, 6, 28)).await, Some(420.0));

        drop(monitor);
        handle.await.unwrap();
        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].message.contains("$32.61"));
    }

    #[tokio::test]
    async fn test_override_alert_for_excluded_hotel() {
        let payload = json!({
            "2025-06-28": { "YLCL": { "status": "open", "min": 190 } },
            "2025-06-29": { "YLCL": { "status": "open", "min": 100 } }
        });
        let (monitor, _source, _notifier, _handle) =
            build(&test_config(), FakeSource::new(vec![Some(payload)]));

        let report = monitor.run_cycle().await;
        assert_eq!(report.override_alerts, 1);
        assert_eq!(report.threshold_alerts, 0);
        // excluded on the 29th, so only the override date was recorded
        assert_eq!(monitor.history_len().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_timeouts_skip_evaluation() {
        let (monitor, source, notifier, handle) =
            build(&test_config(), FakeSource::new(vec![None, None, None]));

        let report = monitor.run_cycle().await;
        assert_eq!(report.status, CycleStatus::FetchFailed);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(monitor.history_len().await, 0);
        assert!(!monitor.is_cycle_running());

        drop(monitor);
        handle.await.unwrap();
        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Error);
    }

    #[tokio::test]
    async fn test_error_notification_can_be_disabled() {
        let mut cfg = test_config();
        cfg.features.notify_on_errors = false;
        let (monitor, _source, notifier, handle) = build(&cfg, FakeSource::new(vec![]));

        assert_eq!(monitor.run_cycle().await.status, CycleStatus::FetchFailed);
        drop(monitor);
        handle.await.unwrap();
        assert!(notifier.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let payload = json!({ "2025-06-30": {} });
        let source = FakeSource::new(vec![Some(payload.clone()), Some(payload)])
            .slow(Duration::from_millis(50));
        let (monitor, source, _notifier, _handle) = build(&test_config(), source);

        let (first, second) = tokio::join!(monitor.run_cycle(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            monitor.run_cycle().await
        });

        assert_eq!(first.status, CycleStatus::Completed);
        assert_eq!(second.status, CycleStatus::Skipped);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_guard_released_when_cycle_is_cancelled() {
        let payload = json!({ "2025-06-30": {} });
        let source = FakeSource::new(vec![Some(payload.clone()), Some(payload)])
            .slow(Duration::from_millis(30));
        let (monitor, _source, _notifier, _handle) = build(&test_config(), source);

        let cancelled = tokio::time::timeout(Duration::from_millis(5), monitor.run_cycle()).await;
        assert!(cancelled.is_err());
        assert!(!monitor.is_cycle_running());

        assert_eq!(monitor.run_cycle().await.status, CycleStatus::Completed);
    }
}
