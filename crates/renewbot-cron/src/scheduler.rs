// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduler: a periodic alert job and a daily summary job sharing one loop.
//!
//! Both triggers are polled from a single `select!`, so one firing always
//! completes before the next one is considered. Jobs return a
//! [`JobOutcome`] or an error; the loop logs either and keeps going.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use renewbot_agent::{DeliveryReport, Whitelist, broadcast, deliver_alerts};
use renewbot_alerts::AlertEngine;
use renewbot_core::{ChannelAdapter, RenewError};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::quiet::is_quiet_hours;
use crate::trigger::DailyTrigger;

/// Fallback wait when the next daily firing cannot be computed.
const DAILY_RETRY_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    QuietHours,
    NoDestinations,
}

/// What one job firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Skipped(SkipReason),
    /// The scan found nothing to send.
    NothingDue,
    Delivered(DeliveryReport),
    /// The digest was sent to `sent` of `destinations` groups.
    SummarySent { destinations: usize, sent: usize },
}

pub struct Scheduler {
    channel: Arc<dyn ChannelAdapter>,
    engine: Arc<AlertEngine>,
    whitelist: Arc<Whitelist>,
    interval: Duration,
    daily: DailyTrigger,
}

impl Scheduler {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        engine: Arc<AlertEngine>,
        whitelist: Arc<Whitelist>,
        interval: Duration,
        daily: DailyTrigger,
    ) -> Self {
        Self {
            channel,
            engine,
            whitelist,
            interval,
            daily,
        }
    }

    /// One periodic firing: quiet-hours and destination checks, scan, deliver.
    ///
    /// Fails only when every send in the pass failed.
    pub async fn run_periodic(&self) -> Result<JobOutcome, RenewError> {
        let now = self.engine.clock().time_of_day();
        if is_quiet_hours(&now) {
            debug!(now = %now, "quiet hours, skipping periodic check");
            return Ok(JobOutcome::Skipped(SkipReason::QuietHours));
        }

        let destinations = self.whitelist.destinations().await;
        if destinations.is_empty() {
            info!("no whitelisted groups, skipping periodic check");
            return Ok(JobOutcome::Skipped(SkipReason::NoDestinations));
        }

        let alerts = self.engine.scan_periodic().await;
        if alerts.is_empty() {
            info!("no alerts to send");
            return Ok(JobOutcome::NothingDue);
        }

        info!(
            alerts = alerts.len(),
            groups = destinations.len(),
            "sending periodic alerts"
        );
        let report = deliver_alerts(self.channel.as_ref(), &self.engine, &destinations, &alerts).await;

        if report.sent == 0 && report.failed > 0 {
            return Err(RenewError::channel(format!(
                "all {} alert sends failed",
                report.failed
            )));
        }
        Ok(JobOutcome::Delivered(report))
    }

    /// One daily firing: scan, format once, send the same digest to every group.
    ///
    /// Not subject to quiet hours. Fails only when every send failed.
    pub async fn run_daily_summary(&self) -> Result<JobOutcome, RenewError> {
        let destinations = self.whitelist.destinations().await;
        if destinations.is_empty() {
            info!("no whitelisted groups, skipping daily summary");
            return Ok(JobOutcome::Skipped(SkipReason::NoDestinations));
        }

        let alerts = self.engine.scan_daily_summary().await;
        let text = self.engine.format_daily_summary(&alerts);
        let sent = broadcast(self.channel.as_ref(), &destinations, &text).await;

        if sent == 0 {
            return Err(RenewError::channel("daily summary could not be sent to any group"));
        }
        Ok(JobOutcome::SummarySent {
            destinations: destinations.len(),
            sent,
        })
    }

    /// Runs both triggers until the token is cancelled.
    ///
    /// The periodic job first fires one interval after start; ticks missed
    /// while a job runs are skipped rather than replayed.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.interval.as_secs(),
            daily = self.daily.pattern(),
            "scheduler started"
        );

        let mut last_daily: Option<DateTime<FixedOffset>> = None;

        loop {
            let (daily_at, daily_delay) = self.next_daily(last_daily.as_ref());

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    log_outcome("periodic", self.run_periodic().await);
                }
                _ = tokio::time::sleep(daily_delay) => {
                    if daily_at.is_some() {
                        last_daily = daily_at;
                    }
                    log_outcome("daily_summary", self.run_daily_summary().await);
                }
            }
        }

        info!("scheduler stopped");
    }

    fn next_daily(
        &self,
        last_fired: Option<&DateTime<FixedOffset>>,
    ) -> (Option<DateTime<FixedOffset>>, Duration) {
        match self.daily.next_firing(&self.engine.clock().now(), last_fired) {
            Ok((at, delay)) => (Some(at), delay),
            Err(e) => {
                error!(error = %e, "failed to compute next daily summary, retrying later");
                (None, DAILY_RETRY_DELAY)
            }
        }
    }
}

fn log_outcome(job: &str, outcome: Result<JobOutcome, RenewError>) {
    match outcome {
        Ok(outcome) => info!(job, ?outcome, "job finished"),
        Err(e) => error!(job, error = %e, "job failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renewbot_core::DestinationId;
    use renewbot_test_utils::{FixedClock, MockChannel, MockStore, sheet_row};

    const G1: DestinationId = DestinationId(-1);
    const G2: DestinationId = DestinationId(-2);

    struct Fixture {
        channel: Arc<MockChannel>,
        store: Arc<MockStore>,
        clock: Arc<FixedClock>,
        engine: Arc<AlertEngine>,
        scheduler: Scheduler,
    }

    fn fixture(time: &str, groups: Vec<DestinationId>) -> Fixture {
        let channel = Arc::new(MockChannel::new());
        let store = Arc::new(MockStore::new(vec![
            sheet_row("Email", "Password", "Type", "Days", "Expiry"),
            sheet_row("a@x.com", "p1", "Office 365", "-1", "08:00:00"),
            sheet_row("b@x.com", "p2", "Copilot", "0", "23:00:00"),
            sheet_row("c@x.com", "p3", "Office 365", "2", "08:00:00"),
        ]));
        let clock = Arc::new(FixedClock::at("2026-10-19", time));
        let engine = Arc::new(AlertEngine::new(store.clone(), clock.clone()));
        let whitelist = Arc::new(Whitelist::with_groups("unused.json", groups));
        let scheduler = Scheduler::new(
            channel.clone(),
            engine.clone(),
            whitelist,
            Duration::from_secs(15 * 60),
            DailyTrigger::daily_summary().unwrap(),
        );
        Fixture {
            channel,
            store,
            clock,
            engine,
            scheduler,
        }
    }

    #[tokio::test]
    async fn periodic_skips_quiet_hours_without_scanning() {
        let f = fixture("23:00:00", vec![G1]);
        f.store.fail_fetches(true);

        let outcome = f.scheduler.run_periodic().await.unwrap();
        assert_eq!(outcome, JobOutcome::Skipped(SkipReason::QuietHours));
        assert_eq!(f.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn periodic_skips_without_destinations() {
        let f = fixture("12:00:00", vec![]);
        let outcome = f.scheduler.run_periodic().await.unwrap();
        assert_eq!(outcome, JobOutcome::Skipped(SkipReason::NoDestinations));
    }

    #[tokio::test]
    async fn periodic_delivers_every_alert_to_every_group() {
        let f = fixture("12:00:00", vec![G1, G2]);
        let outcome = f.scheduler.run_periodic().await.unwrap();

        assert_eq!(
            outcome,
            JobOutcome::Delivered(DeliveryReport {
                sent: 2,
                failed: 0,
                superseded: 0
            })
        );
        assert_eq!(f.channel.sent_to(G1).await.len(), 1);
        assert_eq!(f.channel.sent_to(G2).await.len(), 1);
        assert_eq!(f.engine.tracked_count().await, 2);
    }

    #[tokio::test]
    async fn periodic_repeat_keeps_one_live_message_per_group() {
        let f = fixture("12:00:00", vec![G1, G2]);
        f.scheduler.run_periodic().await.unwrap();
        let outcome = f.scheduler.run_periodic().await.unwrap();

        let JobOutcome::Delivered(report) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };
        assert_eq!(report.superseded, 2);
        assert_eq!(f.channel.deleted_messages().await.len(), 2);
        assert_eq!(f.engine.pending_messages_for("a@x.com", G1).await.len(), 1);
        assert_eq!(f.engine.pending_messages_for("a@x.com", G2).await.len(), 1);
    }

    #[tokio::test]
    async fn periodic_nothing_due() {
        let f = fixture("12:00:00", vec![G1]);
        f.store.set_rows(vec![sheet_row("Email", "Password", "Type", "Days", "Expiry")]);
        assert_eq!(f.scheduler.run_periodic().await.unwrap(), JobOutcome::NothingDue);
    }

    #[tokio::test]
    async fn periodic_fails_when_every_send_fails() {
        let f = fixture("12:00:00", vec![G1]);
        f.channel.fail_destination(G1).await;
        assert!(f.scheduler.run_periodic().await.is_err());
    }

    #[tokio::test]
    async fn daily_summary_ignores_quiet_hours_and_sends_once_per_group() {
        let f = fixture("07:00:00", vec![G1, G2]);
        let outcome = f.scheduler.run_daily_summary().await.unwrap();
        assert_eq!(
            outcome,
            JobOutcome::SummarySent {
                destinations: 2,
                sent: 2
            }
        );

        let sent = f.channel.sent_messages().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].message.text, sent[1].message.text);
        assert!(sent[0].message.text.contains("2 expired account(s)"));
        assert!(sent[0].message.text.contains("b@x.com"));
        assert_eq!(f.engine.tracked_count().await, 0);

        f.clock.set("2026-10-19", "23:30:00");
        assert!(f.scheduler.run_daily_summary().await.is_ok());
    }

    #[tokio::test]
    async fn daily_summary_skips_without_destinations() {
        let f = fixture("07:00:00", vec![]);
        assert_eq!(
            f.scheduler.run_daily_summary().await.unwrap(),
            JobOutcome::Skipped(SkipReason::NoDestinations)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn loop_fires_periodic_after_one_interval_and_stops_on_cancel() {
        let f = Arc::new(fixture("12:00:00", vec![G1]));
        let cancel = CancellationToken::new();
        let task = {
            let f = f.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { f.scheduler.run(cancel).await })
        };

        tokio::time::sleep(Duration::from_secs(14 * 60)).await;
        assert_eq!(f.channel.sent_count().await, 0);

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(f.channel.sent_count().await, 1);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_sends_one_digest_per_occurrence_when_clock_lags() {
        // The pinned clock never advances, so after the digest it still reads 06:59.
        let f = Arc::new(fixture("06:59:00", vec![G1]));
        let cancel = CancellationToken::new();
        let task = {
            let f = f.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { f.scheduler.run(cancel).await })
        };

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(f.channel.sent_count().await, 1);

        // Periodic firings in this window fall in quiet hours.
        tokio::time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(f.channel.sent_count().await, 1);
        assert!(f.channel.sent_messages().await[0].message.text.contains("expired account(s)"));

        cancel.cancel();
        task.await.unwrap();
    }
}
