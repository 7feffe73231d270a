// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete renewbot pipeline.
//!
//! Each test wires the real engine, delivery layer, command handler and
//! scheduler jobs to an in-memory sheet, a mock chat channel and a pinned
//! clock. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use renewbot_agent::{CommandHandler, EventLoop, Whitelist, deliver_alerts};
use renewbot_alerts::AlertEngine;
use renewbot_core::types::{BotCommand, ChatKind, ChatRef, InboundEvent};
use renewbot_core::{ChannelAdapter, DestinationId, MessageId};
use renewbot_cron::{DailyTrigger, JobOutcome, Scheduler, SkipReason};
use renewbot_test_utils::{FixedClock, MockChannel, MockStore, sheet_row};
use tokio_util::sync::CancellationToken;

const GROUP: DestinationId = DestinationId(-1001);
const OTHER_GROUP: DestinationId = DestinationId(-1002);

struct Bot {
    channel: Arc<MockChannel>,
    store: Arc<MockStore>,
    clock: Arc<FixedClock>,
    engine: Arc<AlertEngine>,
    whitelist: Arc<Whitelist>,
    scheduler: Scheduler,
    _dir: tempfile::TempDir,
}

fn header() -> Vec<String> {
    sheet_row("key", "secret", "category", "remaining", "expiry")
}

fn bot(time: &str, rows: Vec<Vec<String>>, groups: Vec<DestinationId>) -> Bot {
    let dir = tempfile::tempdir().unwrap();
    let channel = Arc::new(MockChannel::new());
    let mut all = vec![header()];
    all.extend(rows);
    let store = Arc::new(MockStore::new(all));
    let clock = Arc::new(FixedClock::at("2026-03-01", time));
    let engine = Arc::new(AlertEngine::new(store.clone(), clock.clone()));
    let whitelist = Arc::new(Whitelist::with_groups(dir.path().join("whitelist.json"), groups));
    let scheduler = Scheduler::new(
        channel.clone(),
        engine.clone(),
        whitelist.clone(),
        Duration::from_secs(15 * 60),
        DailyTrigger::daily_summary().unwrap(),
    );
    Bot {
        channel,
        store,
        clock,
        engine,
        whitelist,
        scheduler,
        _dir: dir,
    }
}

impl Bot {
    fn handler(&self) -> CommandHandler {
        CommandHandler::new(
            self.channel.clone(),
            self.engine.clone(),
            self.whitelist.clone(),
            15,
        )
    }

    /// Runs the inbound loop until `replies` messages have been sent in total.
    async fn drive(&self, events: Vec<InboundEvent>, replies: usize) {
        let cancel = CancellationToken::new();
        let event_loop = EventLoop::new(self.channel.clone(), self.handler());
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move { event_loop.run(loop_cancel).await });

        for event in events {
            self.channel.inject_event(event).await;
        }

        let channel = self.channel.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while channel.sent_count().await < replies {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for replies");

        cancel.cancel();
        task.await.unwrap().unwrap();
    }
}

fn group(id: DestinationId) -> ChatRef {
    ChatRef {
        id,
        kind: ChatKind::Supergroup,
    }
}

fn command(chat: ChatRef, command: BotCommand) -> InboundEvent {
    InboundEvent::Command {
        chat,
        message_id: MessageId(500),
        command,
    }
}

fn reply(chat: ChatRef, replied_to: MessageId, text: &str) -> InboundEvent {
    InboundEvent::Reply {
        chat,
        message_id: MessageId(501),
        replied_to,
        text: text.to_string(),
    }
}

// ---- Eligibility at the boundary ----

#[tokio::test]
async fn due_today_row_alerts_only_once_its_time_has_passed() {
    let bot = bot(
        "22:00:00",
        vec![sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00")],
        vec![],
    );
    let alerts = bot.engine.scan_periodic().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].row_index, 2);

    bot.clock.set("2026-03-01", "20:00:00");
    assert!(bot.engine.scan_periodic().await.is_empty());
}

// ---- Renewal write-back ----

#[tokio::test]
async fn mark_renewed_writes_date_and_time_and_reports_result() {
    let rows = (0..4)
        .map(|i| sheet_row(&format!("k{i}@x.com"), "p", "Office 365", "3", "10:00:00"))
        .collect();
    let bot = bot("08:15:30", rows, vec![]);

    assert!(bot.engine.mark_renewed(5).await);
    let writes = bot.store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, 5);
    assert_eq!(writes[0].1.date, "2026-03-01");
    assert_eq!(writes[0].1.time, "08:15:30");

    bot.store.fail_writes(true);
    assert!(!bot.engine.mark_renewed(5).await);
}

// ---- Superseding repeated alerts ----

#[tokio::test]
async fn same_alert_twice_leaves_one_live_tracked_message() {
    let bot = bot(
        "21:30:00",
        vec![sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00")],
        vec![GROUP],
    );
    let alerts = bot.engine.scan_periodic().await;

    deliver_alerts(bot.channel.as_ref(), &bot.engine, &[GROUP], &alerts).await;
    let first = bot.channel.sent_messages().await[0].id;
    deliver_alerts(bot.channel.as_ref(), &bot.engine, &[GROUP], &alerts).await;
    let second = bot.channel.sent_messages().await[1].id;

    assert_eq!(bot.channel.deleted_messages().await, vec![(GROUP, first)]);
    assert_eq!(bot.engine.pending_messages_for("a@x.com", GROUP).await, vec![second]);
    assert_eq!(bot.engine.tracked_count().await, 1);
    assert_eq!(bot.engine.resolve_row_for_message(GROUP, first).await, None);
    assert_eq!(bot.engine.resolve_row_for_message(GROUP, second).await, Some(2));
}

// ---- Full lifecycle through the inbound loop ----

#[tokio::test]
async fn enable_alert_and_confirm_with_done() {
    let bot = bot(
        "21:30:00",
        vec![
            sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00"),
            sheet_row("b@x.com", "p2", "Copilot Pro", "4", "09:00:00"),
        ],
        vec![],
    );

    // Nobody is subscribed yet.
    assert!(matches!(
        bot.scheduler.run_periodic().await.unwrap(),
        JobOutcome::Skipped(SkipReason::NoDestinations)
    ));

    bot.drive(vec![command(group(GROUP), BotCommand::StartMonitoring)], 1).await;
    assert!(bot.whitelist.contains(GROUP).await);
    let saved = std::fs::read_to_string(bot.whitelist.path()).unwrap();
    assert!(saved.contains("-1001"));

    bot.channel.clear_sent().await;
    let outcome = bot.scheduler.run_periodic().await.unwrap();
    let JobOutcome::Delivered(report) = outcome else {
        panic!("expected delivery, got {outcome:?}");
    };
    assert_eq!(report.sent, 1);
    let alert = bot.channel.sent_to(GROUP).await.remove(0);
    assert!(alert.message.text.contains("a@x.com"));

    bot.channel.clear_sent().await;
    bot.drive(vec![reply(group(GROUP), alert.id, "  DONE ")], 1).await;

    let confirmation = &bot.channel.sent_messages().await[0].message;
    assert!(confirmation.text.starts_with("Renewal confirmed!"));
    assert_eq!(confirmation.reply_to, Some(MessageId(501)));
    assert_eq!(bot.store.writes()[0].0, 2);
    assert_eq!(bot.engine.tracked_count().await, 0);
}

#[tokio::test]
async fn manual_check_and_renew_commands() {
    let bot = bot(
        "12:00:00",
        vec![sheet_row("first last@x.com", "p1", "Office 365", "-2", "08:00:00")],
        vec![],
    );

    bot.drive(
        vec![
            command(group(OTHER_GROUP), BotCommand::Check),
            command(group(OTHER_GROUP), BotCommand::Renew("First Last@x.com".into())),
        ],
        4,
    )
    .await;

    let texts: Vec<String> = bot
        .channel
        .sent_messages()
        .await
        .into_iter()
        .map(|m| m.message.text)
        .collect();
    assert_eq!(texts[0], "Running manual check...");
    assert!(texts[1].contains("first last@x.com"));
    assert_eq!(texts[2], "Sent 1 alert(s).");
    assert!(texts[3].starts_with("Successfully renewed for First Last@x.com"));
    assert_eq!(bot.store.writes()[0].0, 2);
}

// ---- Scheduled jobs ----

#[tokio::test]
async fn quiet_hours_hold_periodic_but_not_daily_summary() {
    let bot = bot(
        "23:00:00",
        vec![
            sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00"),
            sheet_row("c@x.com", "p3", "COPILOT", "-1", "05:00:00"),
        ],
        vec![GROUP, OTHER_GROUP],
    );

    assert!(matches!(
        bot.scheduler.run_periodic().await.unwrap(),
        JobOutcome::Skipped(SkipReason::QuietHours)
    ));
    assert_eq!(bot.channel.sent_count().await, 0);

    bot.clock.set("2026-03-02", "07:00:00");
    let outcome = bot.scheduler.run_daily_summary().await.unwrap();
    assert!(matches!(
        outcome,
        JobOutcome::SummarySent {
            destinations: 2,
            sent: 2
        }
    ));

    let first = bot.channel.sent_to(GROUP).await.remove(0).message.text;
    let second = bot.channel.sent_to(OTHER_GROUP).await.remove(0).message.text;
    assert_eq!(first, second);
    assert!(first.contains("2026-03-02"));
    assert!(first.contains("a@x.com"));
    assert!(first.contains("c@x.com"));
}

#[tokio::test]
async fn one_failing_group_does_not_block_the_rest() {
    let bot = bot(
        "21:30:00",
        vec![sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00")],
        vec![GROUP, OTHER_GROUP],
    );
    bot.channel.fail_destination(GROUP).await;

    let JobOutcome::Delivered(report) = bot.scheduler.run_periodic().await.unwrap() else {
        panic!("expected delivery");
    };
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(bot.channel.sent_to(OTHER_GROUP).await.len(), 1);
}

#[tokio::test]
async fn sheet_outage_is_treated_as_nothing_due() {
    let bot = bot(
        "21:30:00",
        vec![sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00")],
        vec![GROUP],
    );
    bot.store.fail_fetches(true);

    assert!(matches!(
        bot.scheduler.run_periodic().await.unwrap(),
        JobOutcome::NothingDue
    ));
    assert_eq!(bot.channel.sent_count().await, 0);
}
