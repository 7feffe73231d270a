// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `renewbot serve` command implementation.
//!
//! Wires the Google Sheets store, the Telegram channel, the alert engine and
//! the whitelist together, then runs the scheduler and the inbound event loop
//! side by side until a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use renewbot_agent::{CommandHandler, EventLoop, Whitelist, shutdown};
use renewbot_alerts::AlertEngine;
use renewbot_config::RenewbotConfig;
use renewbot_core::error::RenewError;
use renewbot_core::types::HealthStatus;
use renewbot_core::{ChannelAdapter, Clock, PluginAdapter, RecordStore, SystemClock};
use renewbot_cron::{DailyTrigger, Scheduler};
use renewbot_sheets::SheetsClient;
use renewbot_telegram::TelegramChannel;
use tracing::{error, info, warn};

/// Builds the clock for the configured UTC offset.
pub fn build_clock(config: &RenewbotConfig) -> Result<Arc<dyn Clock>, RenewError> {
    let minutes = config.schedule.utc_offset_minutes;
    let clock = SystemClock::from_offset_minutes(minutes)
        .ok_or_else(|| RenewError::Config(format!("invalid UTC offset: {minutes} minutes")))?;
    Ok(Arc::new(clock))
}

/// Builds the Sheets-backed record store.
pub async fn build_store(config: &RenewbotConfig) -> Result<Arc<dyn RecordStore>, RenewError> {
    let client = SheetsClient::from_config(&config.sheets).await?;
    Ok(Arc::new(client))
}

/// Runs the `renewbot serve` command.
pub async fn run_serve(config: RenewbotConfig) -> Result<(), RenewError> {
    info!("starting renewbot serve");

    let clock = build_clock(&config)?;
    let store = build_store(&config).await?;
    log_health(store.as_ref()).await;

    let mut telegram = TelegramChannel::new(&config.telegram)?;
    telegram.connect().await?;
    log_health(&telegram).await;
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    let engine = Arc::new(AlertEngine::new(store, clock));
    let whitelist = Arc::new(Whitelist::load(config.whitelist.path.clone()).await);
    info!(
        groups = whitelist.len().await,
        path = %whitelist.path().display(),
        "whitelist loaded"
    );

    let minutes = config.schedule.check_interval_minutes;
    let scheduler = Scheduler::new(
        channel.clone(),
        engine.clone(),
        whitelist.clone(),
        Duration::from_secs(minutes.saturating_mul(60)),
        DailyTrigger::daily_summary()?,
    );
    let handler = CommandHandler::new(channel.clone(), engine, whitelist, minutes);
    let event_loop = EventLoop::new(channel.clone(), handler);

    let cancel = shutdown::install_signal_handler();

    let scheduler_cancel = cancel.clone();
    let scheduler_task = tokio::spawn(async move {
        scheduler.run(scheduler_cancel).await;
    });

    info!(interval_minutes = minutes, "renewbot running");
    let loop_result = event_loop.run(cancel.clone()).await;

    // The event loop also ends when the channel closes; take the scheduler down with it.
    cancel.cancel();
    if let Err(e) = scheduler_task.await {
        error!(error = %e, "scheduler task panicked");
    }

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "channel shutdown failed");
    }

    info!("renewbot serve shutdown complete");
    loop_result
}

/// Logs an adapter's health. A failing check never stops startup.
async fn log_health<A: PluginAdapter + ?Sized>(adapter: &A) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "health check passed"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

/// Initialize the tracing subscriber with an env filter.
///
/// `RUST_LOG` wins when set; otherwise the configured level applies to
/// renewbot crates and everything else logs warnings only. Output goes to
/// stderr so `check` and `summary` keep stdout for their results.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_filter(log_level: &str) -> String {
    // Target matching is by prefix, so this covers every renewbot_* crate.
    format!("renewbot={log_level},warn")
}
