//! Periodic scan for events whose reminder window has opened
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Cancellable run loop, ticks never overlap
//! - 1.0.0: Initial polling scheduler

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::notifier::{format_reminder, Notifier};
use crate::features::events::EventStore;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// What one scan did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub due: usize,
    pub sent: usize,
    pub send_failures: usize,
    pub mark_failures: usize,
}

/// Sends each due event's reminder once
///
/// Every tick queries the store for due events, dispatches a reminder and then
/// marks the event notified. The flag is set even when sending failed, so a
/// failed send is not retried. A failed mark leaves the event due, so it may
/// be sent again on the next tick.
///
/// Events whose start time passed before any scan saw them (for example while
/// the process was down) are never reminded: the due query only matches
/// events that have not started yet.
pub struct ReminderScheduler {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(store: Arc<dyn EventStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until `shutdown` is cancelled
    ///
    /// Each tick is awaited before the next one is polled, so scans never run
    /// concurrently; ticks missed while a scan was running are skipped. A
    /// cancellation arriving mid-scan takes effect once the scan finishes.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "⏰ Reminder scheduler started (every {}s)",
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.tick(Utc::now()).await;
                }
            }
        }

        info!("⏰ Reminder scheduler stopped");
    }

    /// Scan once as of `now`
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        let events = match self.store.find_due_for_notification(now).await {
            Ok(events) => events,
            Err(e) => {
                error!("Failed to query due reminders: {e}");
                return report;
            }
        };
        report.due = events.len();

        for event in events {
            let text = format_reminder(&event);
            match self.notifier.send(event.owner_id, &text).await {
                Ok(()) => {
                    report.sent += 1;
                    info!(
                        "🔔 Reminded owner {} about event {} '{}'",
                        event.owner_id, event.id, event.title
                    );
                }
                Err(e) => {
                    report.send_failures += 1;
                    warn!("Failed to send reminder for event {}: {e}", event.id);
                }
            }

            if let Err(e) = self.store.mark_notified(event.id).await {
                report.mark_failures += 1;
                error!("Failed to mark event {} as notified: {e}", event.id);
            }
        }

        if report.due > 0 {
            debug!("Reminder tick at {now}: {report:?}");
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::events::NewEvent;
    use crate::features::events::OwnerId;
    use crate::testing::{FlakyStore, RecordingNotifier};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Timelike};
    use tokio::sync::Notify;

    /// Holds every send until released
    #[derive(Default)]
    struct GatedNotifier {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Notifier for GatedNotifier {
        async fn send(&self, _owner_id: OwnerId, _text: &str) -> anyhow::Result<()> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now().with_nanosecond(0).unwrap()
    }

    fn minutes(n: i64) -> ChronoDuration {
        ChronoDuration::minutes(n)
    }

    async fn setup() -> (ReminderScheduler, Arc<FlakyStore>, Arc<RecordingNotifier>) {
        let store = FlakyStore::new().await;
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = ReminderScheduler::new(store.clone(), notifier.clone());
        (scheduler, store, notifier)
    }

    #[tokio::test]
    async fn test_due_event_is_notified_once() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        let id = store.create(&NewEvent::new(9, "Standup", now + minutes(10), 15, 15).unwrap()).await.unwrap();

        let report = scheduler.tick(now).await;
        assert_eq!(report, TickReport { due: 1, sent: 1, ..Default::default() });

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 9);
        assert!(sent[0].1.contains("Standup"));
        assert!(store.get_by_id(9, id).await.unwrap().unwrap().notified);

        assert_eq!(scheduler.tick(now).await.due, 0);
        assert_eq!(scheduler.tick(now + minutes(1)).await.due, 0);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_event_outside_window_waits() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        store.create(&NewEvent::new(1, "Later", now + minutes(30), 15, 10).unwrap()).await.unwrap();

        assert_eq!(scheduler.tick(now).await.due, 0);
        assert_eq!(scheduler.tick(now + minutes(20)).await.sent, 1);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_started_events_are_skipped() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        store.create(&NewEvent::new(1, "Now", now, 15, 10).unwrap()).await.unwrap();
        store.create(&NewEvent::new(1, "Zero lead", now + minutes(5), 15, 0).unwrap()).await.unwrap();

        assert_eq!(scheduler.tick(now).await.due, 0);
        // start time passed without a scan inside the window
        assert_eq!(scheduler.tick(now + minutes(6)).await.due, 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_still_marks_notified() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        let id = store.create(&NewEvent::new(1, "Flaky", now + minutes(5), 15, 10).unwrap()).await.unwrap();
        notifier.fail(true);

        let report = scheduler.tick(now).await;
        assert_eq!(report.send_failures, 1);
        assert!(store.get_by_id(1, id).await.unwrap().unwrap().notified);

        notifier.fail(false);
        assert_eq!(scheduler.tick(now).await.due, 0);
    }

    #[tokio::test]
    async fn test_mark_failure_allows_resend_next_tick() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        store.create(&NewEvent::new(1, "Retry", now + minutes(5), 15, 10).unwrap()).await.unwrap();
        store.fail_mark(true);

        let report = scheduler.tick(now).await;
        assert_eq!(report.mark_failures, 1);

        store.fail_mark(false);
        let report = scheduler.tick(now + minutes(1)).await;
        assert_eq!(report.sent, 1);
        assert_eq!(report.mark_failures, 0);
        assert_eq!(notifier.sent().len(), 2);

        assert_eq!(scheduler.tick(now + minutes(2)).await.due, 0);
    }

    #[tokio::test]
    async fn test_query_failure_reports_nothing() {
        let (scheduler, store, notifier) = setup().await;
        let now = now();
        store.create(&NewEvent::new(1, "Hidden", now + minutes(5), 15, 10).unwrap()).await.unwrap();
        store.fail_query(true);

        assert_eq!(scheduler.tick(now).await, TickReport::default());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_when_cancelled() {
        let (scheduler, store, notifier) = setup().await;
        store.create(&NewEvent::new(1, "Soon", Utc::now() + minutes(10), 15, 15).unwrap()).await.unwrap();

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        scheduler.run(shutdown).await;

        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_ticks_then_shuts_down() {
        let (scheduler, store, notifier) = setup().await;
        store.create(&NewEvent::new(1, "Soon", Utc::now() + minutes(10), 15, 15).unwrap()).await.unwrap();

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(scheduler.with_interval(Duration::from_secs(3600)).run(shutdown.clone()));

        // the first interval tick fires immediately
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_mid_tick_lets_tick_finish() {
        let store = FlakyStore::new().await;
        let notifier = Arc::new(GatedNotifier::default());
        let id = store
            .create(&NewEvent::new(1, "Slow", Utc::now() + minutes(10), 15, 15).unwrap())
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let scheduler = ReminderScheduler::new(store.clone(), notifier.clone());
        let handle = tokio::spawn(scheduler.run(shutdown.clone()));

        notifier.entered.notified().await;
        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        assert!(!store.get_by_id(1, id).await.unwrap().unwrap().notified);

        notifier.release.notify_one();
        handle.await.unwrap();

        assert!(store.get_by_id(1, id).await.unwrap().unwrap().notified);
    }
}
