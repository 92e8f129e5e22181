//! Test doubles shared by the unit tests

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::reply::{Reply, Responder};
use crate::database::Database;
use crate::features::events::{Event, EventId, EventStore, NewEvent, OwnerId, StoreError};
use crate::features::reminders::Notifier;

/// Ordered record of store calls and responses, shared between doubles
pub type Journal = Arc<Mutex<Vec<String>>>;

/// In-memory sqlite store that can be told to fail individual operations
pub struct FlakyStore {
    inner: Database,
    journal: Journal,
    fail_create: AtomicBool,
    fail_get: AtomicBool,
    fail_delete: AtomicBool,
    fail_query: AtomicBool,
    fail_mark: AtomicBool,
}

impl FlakyStore {
    pub async fn new() -> Arc<Self> {
        Self::with_journal(Journal::default()).await
    }

    pub async fn with_journal(journal: Journal) -> Arc<Self> {
        let inner = Database::new(":memory:").await.unwrap();
        Arc::new(Self {
            inner,
            journal,
            fail_create: AtomicBool::new(false),
            fail_get: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_query: AtomicBool::new(false),
            fail_mark: AtomicBool::new(false),
        })
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_query(&self, fail: bool) {
        self.fail_query.store(fail, Ordering::SeqCst);
    }

    pub fn fail_mark(&self, fail: bool) {
        self.fail_mark.store(fail, Ordering::SeqCst);
    }

    fn check(&self, flag: &AtomicBool, operation: &str) -> Result<(), StoreError> {
        self.journal.lock().unwrap().push(operation.to_string());
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{operation} disabled in test")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn create(&self, event: &NewEvent) -> Result<EventId, StoreError> {
        self.check(&self.fail_create, "create")?;
        self.inner.create(event).await
    }

    async fn get_by_id(&self, owner_id: OwnerId, id: EventId) -> Result<Option<Event>, StoreError> {
        self.check(&self.fail_get, "get_by_id")?;
        self.inner.get_by_id(owner_id, id).await
    }

    async fn delete_by_id(&self, owner_id: OwnerId, id: EventId) -> Result<bool, StoreError> {
        self.check(&self.fail_delete, "delete_by_id")?;
        self.inner.delete_by_id(owner_id, id).await
    }

    async fn list_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<Vec<Event>, StoreError> {
        self.check(&self.fail_query, "list_for_owner_on_day")?;
        self.inner.list_for_owner_on_day(owner_id, day).await
    }

    async fn delete_all_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<usize, StoreError> {
        self.check(&self.fail_delete, "delete_all_for_owner_on_day")?;
        self.inner.delete_all_for_owner_on_day(owner_id, day).await
    }

    async fn find_due_for_notification(&self, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        self.check(&self.fail_query, "find_due_for_notification")?;
        self.inner.find_due_for_notification(now).await
    }

    async fn mark_notified(&self, id: EventId) -> Result<(), StoreError> {
        self.check(&self.fail_mark, "mark_notified")?;
        self.inner.mark_notified(id).await
    }
}

/// Collects acknowledgements and replies in order
#[derive(Default)]
pub struct RecordingResponder {
    journal: Journal,
    acks: Mutex<Vec<String>>,
    replies: Mutex<Vec<Reply>>,
}

impl RecordingResponder {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn acks(&self) -> Vec<String> {
        self.acks.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.replies.lock().unwrap().last().map(|r| r.text.clone())
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn acknowledge(&self, text: &str) -> Result<()> {
        self.journal.lock().unwrap().push("ack".to_string());
        self.acks.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        self.journal.lock().unwrap().push("reply".to_string());
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }
}

/// Records sent reminders; can be switched to fail every send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(OwnerId, String)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(OwnerId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, owner_id: OwnerId, text: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("channel {owner_id} unreachable");
        }
        self.sent.lock().unwrap().push((owner_id, text.to_string()));
        Ok(())
    }
}
