//! SQLite-backed event storage
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Configurable busy timeout, owner/notified indexes
//! - 1.1.0: Day-scoped listing and bulk delete
//! - 1.0.0: Initial events table

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use sqlite::{Connection, State, Statement};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::features::events::{day_bounds, Event, EventId, EventStore, NewEvent, OwnerId, StoreError};

/// Default time a statement waits on a locked database before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        start_time INTEGER NOT NULL,
        end_time INTEGER NOT NULL,
        notify_before_minutes INTEGER NOT NULL DEFAULT 5,
        notified INTEGER NOT NULL DEFAULT 0
    );
    CREATE INDEX IF NOT EXISTS idx_events_owner_start ON events (owner_id, start_time);
    CREATE INDEX IF NOT EXISTS idx_events_notified ON events (notified, start_time);
";

const EVENT_COLUMNS: &str =
    "id, owner_id, title, start_time, end_time, notify_before_minutes, notified";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        Self::with_busy_timeout(database_path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open the database, set the busy timeout and create the schema
    pub async fn with_busy_timeout(database_path: &str, busy_timeout: Duration) -> Result<Self> {
        let mut connection = sqlite::open(database_path)?;
        let busy_timeout_ms = i32::try_from(busy_timeout.as_millis())
            .ok()
            .and_then(|ms| usize::try_from(ms).ok())
            .with_context(|| format!("busy timeout of {busy_timeout:?} is too large"))?;
        connection.set_busy_timeout(busy_timeout_ms)?;
        connection.execute(SCHEMA)?;

        info!("💾 Event database ready at {database_path}");

        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn collect_events(statement: &mut Statement<'_>) -> Result<Vec<Event>, StoreError> {
        let mut events = Vec::new();
        while let State::Row = statement.next()? {
            events.push(Self::read_event(statement)?);
        }
        Ok(events)
    }

    fn read_event(statement: &Statement<'_>) -> Result<Event, StoreError> {
        let notify_before = statement.read::<i64, _>("notify_before_minutes")?;
        let notify_before_minutes =
            u32::try_from(notify_before).map_err(|_| StoreError::Corrupt {
                column: "notify_before_minutes",
                value: notify_before.to_string(),
            })?;

        Ok(Event {
            id: statement.read::<i64, _>("id")?,
            owner_id: statement.read::<i64, _>("owner_id")?,
            title: statement.read::<String, _>("title")?,
            start_time: timestamp(statement, "start_time")?,
            end_time: timestamp(statement, "end_time")?,
            notify_before_minutes,
            notified: statement.read::<i64, _>("notified")? != 0,
        })
    }
}

fn timestamp(statement: &Statement<'_>, column: &'static str) -> Result<DateTime<Utc>, StoreError> {
    let seconds = statement.read::<i64, _>(column)?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| StoreError::Corrupt {
        column,
        value: seconds.to_string(),
    })
}

#[async_trait]
impl EventStore for Database {
    async fn create(&self, event: &NewEvent) -> Result<EventId, StoreError> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(
            "INSERT INTO events (owner_id, title, start_time, end_time, notify_before_minutes, notified)
             VALUES (?, ?, ?, ?, ?, 0)",
        )?;
        statement.bind((1, event.owner_id))?;
        statement.bind((2, event.title.as_str()))?;
        statement.bind((3, event.start_time.timestamp()))?;
        statement.bind((4, event.end_time.timestamp()))?;
        statement.bind((5, i64::from(event.notify_before_minutes)))?;
        statement.next()?;

        let mut statement = connection.prepare("SELECT last_insert_rowid()")?;
        let id = match statement.next()? {
            State::Row => statement.read::<i64, _>(0)?,
            State::Done => {
                return Err(StoreError::Unavailable(
                    "insert did not report a row id".to_string(),
                ))
            }
        };

        debug!("Stored event {id} for owner {}", event.owner_id);
        Ok(id)
    }

    async fn get_by_id(
        &self,
        owner_id: OwnerId,
        id: EventId,
    ) -> Result<Option<Event>, StoreError> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = ? AND id = ?"
        ))?;
        statement.bind((1, owner_id))?;
        statement.bind((2, id))?;

        match statement.next()? {
            State::Row => Ok(Some(Self::read_event(&statement)?)),
            State::Done => Ok(None),
        }
    }

    async fn delete_by_id(&self, owner_id: OwnerId, id: EventId) -> Result<bool, StoreError> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare("DELETE FROM events WHERE owner_id = ? AND id = ?")?;
        statement.bind((1, owner_id))?;
        statement.bind((2, id))?;
        statement.next()?;

        Ok(connection.change_count() > 0)
    }

    async fn list_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<Vec<Event>, StoreError> {
        let (from, to) = day_bounds(day);
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE owner_id = ? AND start_time >= ? AND start_time < ?
             ORDER BY start_time, id"
        ))?;
        statement.bind((1, owner_id))?;
        statement.bind((2, from.timestamp()))?;
        statement.bind((3, to.timestamp()))?;

        Self::collect_events(&mut statement)
    }

    async fn delete_all_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<usize, StoreError> {
        let (from, to) = day_bounds(day);
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(
            "DELETE FROM events WHERE owner_id = ? AND start_time >= ? AND start_time < ?",
        )?;
        statement.bind((1, owner_id))?;
        statement.bind((2, from.timestamp()))?;
        statement.bind((3, to.timestamp()))?;
        statement.next()?;

        Ok(connection.change_count())
    }

    async fn find_due_for_notification(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE notified = 0
               AND start_time > ?1
               AND start_time - ?1 <= notify_before_minutes * 60
             ORDER BY start_time, id"
        ))?;
        statement.bind((1, now.timestamp()))?;

        Self::collect_events(&mut statement)
    }

    async fn mark_notified(&self, id: EventId) -> Result<(), StoreError> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare("UPDATE events SET notified = 1 WHERE id = ?")?;
        statement.bind((1, id))?;
        statement.next()?;

        Ok(())
    }
}
