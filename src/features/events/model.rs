//! Event records and the local-time helpers shared by listing and reminders
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Checked end time arithmetic
//! - 1.1.0: Day bounds resolved through the local timezone
//! - 1.0.0: Initial event model

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Identifier of the chat an event belongs to (the Discord channel id)
pub type OwnerId = i64;

/// Store-assigned event identifier
pub type EventId = i64;

/// Clock format used for event times in every user-facing message
pub const CLOCK_FORMAT: &str = "%H:%M";

/// A stored calendar event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub owner_id: OwnerId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notify_before_minutes: u32,
    pub notified: bool,
}

/// An event that has not been stored yet
///
/// The store assigns the id and always starts with `notified = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub owner_id: OwnerId,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notify_before_minutes: u32,
}

impl NewEvent {
    /// Build an event spanning `duration_minutes` from `start_time`
    ///
    /// Returns `None` when the end time falls outside the representable range.
    pub fn new(
        owner_id: OwnerId,
        title: impl Into<String>,
        start_time: DateTime<Utc>,
        duration_minutes: u32,
        notify_before_minutes: u32,
    ) -> Option<Self> {
        Some(Self {
            owner_id,
            title: title.into(),
            start_time,
            end_time: end_time_after(start_time, duration_minutes)?,
            notify_before_minutes,
        })
    }

    /// Attach the id assigned by the store
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            owner_id: self.owner_id,
            title: self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            notify_before_minutes: self.notify_before_minutes,
            notified: false,
        }
    }
}

impl Event {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Start time rendered as `HH:MM` in local time
    pub fn start_clock(&self) -> String {
        format_clock(self.start_time)
    }

    /// End time rendered as `HH:MM` in local time
    pub fn end_clock(&self) -> String {
        format_clock(self.end_time)
    }

    /// Whether the reminder window is open at `now`
    ///
    /// Mirrors the store's due query: the event has not been notified, it starts
    /// strictly after `now`, and it starts within `notify_before_minutes`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.notified
            && self.start_time > now
            && self.start_time - now <= Duration::minutes(i64::from(self.notify_before_minutes))
    }
}

/// `start + duration_minutes`, or `None` on overflow
pub fn end_time_after(start: DateTime<Utc>, duration_minutes: u32) -> Option<DateTime<Utc>> {
    start.checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
}

pub fn format_clock(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format(CLOCK_FORMAT).to_string()
}

/// Resolve a local wall-clock time to UTC
///
/// Returns `None` when the time does not exist locally (DST gap). Ambiguous
/// times resolve to the earlier instant.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The `[start, end)` UTC range covering one local calendar day
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(day);
    let end = day
        .succ_opt()
        .map(local_midnight)
        .or_else(|| start.checked_add_signed(Duration::days(1)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    local_to_utc(day, NaiveTime::MIN).unwrap_or_else(|| day.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_event_end_time() {
        let event = NewEvent::new(1, "Standup", start(), 60, 10).unwrap();
        assert_eq!(event.end_time - event.start_time, Duration::minutes(60));

        let stored = event.into_event(7);
        assert_eq!(stored.id, 7);
        assert!(!stored.notified);
        assert_eq!(stored.duration_minutes(), 60);
    }

    #[test]
    fn test_new_event_rejects_out_of_range_end() {
        let last = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);
        assert!(NewEvent::new(1, "Edge", last, 10, 0).is_some());
        assert!(NewEvent::new(1, "Too far", last, 11, 0).is_none());
        assert!(NewEvent::new(1, "Too far", last, u32::MAX, 0).is_none());
    }

    #[test]
    fn test_is_due_window() {
        let event = NewEvent::new(1, "Review", start(), 30, 15).unwrap().into_event(1);

        assert!(!event.is_due(start() - Duration::minutes(16)));
        assert!(event.is_due(start() - Duration::minutes(15)));
        assert!(event.is_due(start() - Duration::seconds(1)));
        assert!(!event.is_due(start()));
        assert!(!event.is_due(start() + Duration::minutes(1)));
    }

    #[test]
    fn test_is_due_zero_lead_time() {
        let event = NewEvent::new(1, "Call", start(), 30, 0).unwrap().into_event(1);
        assert!(!event.is_due(start()));
        assert!(!event.is_due(start() - Duration::minutes(1)));
    }

    #[test]
    fn test_notified_event_is_never_due() {
        let mut event = NewEvent::new(1, "Call", start(), 30, 15).unwrap().into_event(1);
        event.notified = true;
        assert!(!event.is_due(start() - Duration::minutes(5)));
    }

    #[test]
    fn test_day_bounds_cover_local_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let (from, to) = day_bounds(day);
        assert!(from < to);

        let noon = local_to_utc(day, NaiveTime::from_hms_opt(12, 0, 0).unwrap()).unwrap();
        assert!(from <= noon && noon < to);
        assert_eq!(from.with_timezone(&Local).date_naive(), day);
    }

    #[test]
    fn test_format_clock_uses_local_time() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let at = local_to_utc(day, NaiveTime::from_hms_opt(9, 5, 0).unwrap()).unwrap();
        assert_eq!(format_clock(at), "09:05");
    }
}
