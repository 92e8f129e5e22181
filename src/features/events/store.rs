//! Event store contract
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: `delete_by_id` reports whether a row was removed
//! - 1.0.0: Initial contract

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use super::model::{Event, EventId, NewEvent, OwnerId};

/// Errors surfaced by an [`EventStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlite::Error),

    #[error("corrupt value in column `{column}`: {value}")]
    Corrupt { column: &'static str, value: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable storage for events
///
/// Every owner-scoped operation filters on `owner_id` so one chat can never
/// read or remove another chat's events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event and return its id
    async fn create(&self, event: &NewEvent) -> Result<EventId, StoreError>;

    async fn get_by_id(&self, owner_id: OwnerId, id: EventId)
        -> Result<Option<Event>, StoreError>;

    /// Delete one event; returns `false` when nothing matched
    async fn delete_by_id(&self, owner_id: OwnerId, id: EventId) -> Result<bool, StoreError>;

    /// Events starting on the given local day, ordered by start time
    async fn list_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<Vec<Event>, StoreError>;

    /// Delete every event starting on the given local day; returns the count removed
    async fn delete_all_for_owner_on_day(
        &self,
        owner_id: OwnerId,
        day: NaiveDate,
    ) -> Result<usize, StoreError>;

    /// Events whose reminder window is open at `now`
    ///
    /// Matches `notified = false`, `start_time > now` and
    /// `start_time - now <= notify_before_minutes`. Events whose start time has
    /// already passed are never returned, even if they were never notified.
    async fn find_due_for_notification(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError>;

    async fn mark_notified(&self, id: EventId) -> Result<(), StoreError>;
}
