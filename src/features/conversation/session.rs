//! Per-owner conversation sessions
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Lookups without insertion, empty slots released
//! - 1.1.0: Steps carry their accumulated fields; per-owner slot locking
//! - 1.0.0: Initial session map

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::features::events::{Event, OwnerId};

/// Lead time used when a session is not seeded from an existing event
pub const DEFAULT_NOTIFY_BEFORE_MINUTES: u32 = 5;

/// Where a session is in the creation flow, with everything collected so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Date,
    StartTime {
        date: NaiveDate,
    },
    Duration {
        start: DateTime<Utc>,
    },
    NotifyBefore {
        start: DateTime<Utc>,
        duration_minutes: u32,
    },
    Title {
        start: DateTime<Utc>,
        duration_minutes: u32,
        notify_before_minutes: u32,
    },
}

impl Step {
    /// 1-based position in the flow, used in logs
    pub fn number(&self) -> u8 {
        match self {
            Step::Date => 1,
            Step::StartTime { .. } => 2,
            Step::Duration { .. } => 3,
            Step::NotifyBefore { .. } => 4,
            Step::Title { .. } => 5,
        }
    }
}

/// Values carried over from the event being edited
///
/// Shown as hints in the prompts; every step still asks for a fresh value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub start: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub notify_before_minutes: u32,
    pub title: Option<String>,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            start: None,
            duration_minutes: None,
            notify_before_minutes: DEFAULT_NOTIFY_BEFORE_MINUTES,
            title: None,
        }
    }
}

impl From<&Event> for Seed {
    fn from(event: &Event) -> Self {
        Self {
            start: Some(event.start_time),
            duration_minutes: Some(event.duration_minutes()),
            notify_before_minutes: event.notify_before_minutes,
            title: Some(event.title.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub step: Step,
    pub seed: Seed,
}

impl Session {
    pub fn new() -> Self {
        Self::seeded(Seed::default())
    }

    pub fn seeded(seed: Seed) -> Self {
        Self {
            step: Step::Date,
            seed,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

type Slot = Arc<Mutex<Option<Session>>>;

/// In-memory session slots keyed by owner
///
/// Each owner gets one slot behind an async mutex. Holding the slot guard for
/// the whole handling of an input serializes that owner's inputs while other
/// owners proceed in parallel.
#[derive(Clone, Default)]
pub struct SessionStore {
    slots: Arc<DashMap<OwnerId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the owner's slot, creating an empty one on first use
    pub async fn lock(&self, owner_id: OwnerId) -> OwnedMutexGuard<Option<Session>> {
        let slot = self.slots.entry(owner_id).or_default().clone();
        slot.lock_owned().await
    }

    /// Lock the owner's slot if one exists, without creating it
    pub async fn lock_existing(&self, owner_id: OwnerId) -> Option<OwnedMutexGuard<Option<Session>>> {
        let slot = self.slots.get(&owner_id).map(|slot| slot.clone())?;
        Some(slot.lock_owned().await)
    }

    /// Remove the owner's slot once it is empty and no task holds it
    pub fn release(&self, owner_id: OwnerId) {
        self.slots.remove_if(&owner_id, |_, slot| {
            Arc::strong_count(slot) == 1
                && slot
                    .try_lock()
                    .map(|session| session.is_none())
                    .unwrap_or(false)
        });
    }

    /// Number of owners with a slot, active or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Snapshot of the owner's current session
    pub async fn get(&self, owner_id: OwnerId) -> Option<Session> {
        let slot = self.slots.get(&owner_id).map(|slot| slot.clone())?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of owners with a session in progress
    pub async fn active_count(&self) -> usize {
        let slots: Vec<Slot> = self.slots.iter().map(|entry| entry.value().clone()).collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }
}
