// src/app.rs
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::{Monitor, Scheduler};
use crate::config::Config;
use crate::infrastructure::{
    AvailabilityClient, LogNotifier, NotificationDispatcher, Notifier, WebhookNotifier,
};
use crate::shared::types::Notification;
use crate::shared::utils::format_price;

/// Cooldowns a `--once` run waits for queued notifications before exiting.
const DRAIN_COOLDOWNS: u32 = 3;
const MIN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub config: Config,
    /// Run a single cycle and exit
    pub once: bool,
}

impl AppCfg {
    pub fn from_config(mut config: Config, override_dry_run: bool, once: bool) -> Self {
        if override_dry_run {
            config.features.dry_run = true;
        }
        Self { config, once }
    }
}

fn build_notifier(cfg: &Config) -> Result<Arc<dyn Notifier>> {
    if cfg.features.dry_run {
        info!("Dry run: notifications will only be logged");
        return Ok(Arc::new(LogNotifier));
    }
    match cfg.notifier.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => {
            let notifier =
                WebhookNotifier::new(url, &cfg.notifier).context("build webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("⚠️ No webhook URL configured; notifications will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

fn drain_timeout(cooldown: Duration) -> Duration {
    cooldown.saturating_mul(DRAIN_COOLDOWNS).max(MIN_DRAIN_TIMEOUT)
}

fn startup_message(cfg: &Config) -> Notification {
    Notification::info(
        "Hotel monitor started",
        format!(
            "Watching {} to {} below {}, checking every {} minutes.",
            cfg.monitor.start_date,
            cfg.monitor.end_date,
            format_price(cfg.monitor.price_threshold),
            cfg.monitor.check_interval_minutes
        ),
    )
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    let cfg = app_cfg.config;
    info!("🚀 Starting hotel price monitor");
    info!(
        "Range {}..={}, threshold {}, interval {} min, {} excluded codes, \
         {} excluded suffixes, {} overrides",
        cfg.monitor.start_date,
        cfg.monitor.end_date,
        format_price(cfg.monitor.price_threshold),
        cfg.monitor.check_interval_minutes,
        cfg.exclusions.hotel_codes.len(),
        cfg.exclusions.suffixes.len(),
        cfg.overrides.len()
    );

    let notifier = build_notifier(&cfg)?;
    let cooldown = Duration::from_secs(cfg.notifier.rate_limit_cooldown_secs);
    let (dispatcher, delivery) =
        NotificationDispatcher::spawn(notifier, cooldown, drain_timeout(cooldown));

    let source = AvailabilityClient::new(&cfg.api).context("build availability client")?;
    let monitor = Monitor::new(&cfg, Arc::new(source), dispatcher.clone());

    if cfg.features.notify_on_start {
        dispatcher.dispatch(startup_message(&cfg));
    }

    let mut scheduler = Scheduler::new(cfg.check_interval());

    if app_cfg.once {
        let report = scheduler.run_once(&monitor).await;
        info!("Single cycle finished with status {:?}", report.status);
        // let queued notifications go out before exiting, bounded by the drain timeout
        drop(monitor);
        drop(dispatcher);
        delivery.await.context("notification task panicked")?;
    } else {
        scheduler.run(&monitor, shutdown_signal()).await;
        delivery.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_override() {
        let app_cfg = AppCfg::from_config(Config::default(), true, false);
        assert!(app_cfg.config.features.dry_run);

        let app_cfg = AppCfg::from_config(Config::default(), false, true);
        assert!(!app_cfg.config.features.dry_run);
        assert!(app_cfg.once);
    }

    #[test]
    fn test_startup_message_describes_range() {
        let mut cfg = Config::default();
        cfg.monitor.start_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
        cfg.monitor.end_date = chrono::NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        let n = startup_message(&cfg);
        assert!(n.message.contains("2025-06-27 to 2025-07-02"));
        assert!(n.message.contains("$225.00"));
    }

    #[test]
    fn test_drain_timeout_scales_with_cooldown() {
        assert_eq!(drain_timeout(Duration::from_secs(5)), Duration::from_secs(15));
        assert_eq!(drain_timeout(Duration::ZERO), MIN_DRAIN_TIMEOUT);
        assert_eq!(drain_timeout(Duration::from_secs(u64::MAX)), Duration::MAX);
    }

    #[tokio::test]
    async fn test_once_with_unreachable_api_still_exits() {
        let mut cfg = Config::default();
        cfg.api.base_url = "http://127.0.0.1:9/availability".to_string();
        cfg.api.max_attempts = 1;
        cfg.features.dry_run = true;

        let result = run(AppCfg::from_config(cfg, false, true)).await;
        assert!(result.is_ok());
    }
}
