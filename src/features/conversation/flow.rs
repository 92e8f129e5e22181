//! Step-by-step event creation
//!
//! Date → start time → duration → reminder lead time → title, then the event is
//! stored and the session is dropped. Bad input re-prompts the same step and
//! keeps everything collected so far.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.3.0: Strict dates, overflow-safe durations, no slots for sessionless input
//! - 1.2.0: Edit flow shows the current values as hints
//! - 1.1.0: Reject zero durations, empty titles and nonexistent local times
//! - 1.0.0: Initial five-step flow

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;

use super::session::{Seed, Session, SessionStore, Step};
use crate::core::reply::{Action, Reply};
use crate::features::events::{
    end_time_after, format_clock, local_to_utc, EventId, EventStore, NewEvent, OwnerId,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

const DATE_ACTIONS: [Action; 2] = [Action::DateToday, Action::DateTomorrow];

/// Titles starting with `/` would be read as commands
const TITLE_PROMPT: &str = "Enter the event title (it can't start with /):";

pub const NO_ACTIVE_STEP: &str = "No active event creation, or this is not the date step.";

/// Quick date buttons offered at the first step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickDate {
    Today,
    Tomorrow,
}

impl QuickDate {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            QuickDate::Today => today,
            QuickDate::Tomorrow => today.succ_opt().unwrap_or(today),
        }
    }
}

/// Outcome of a quick date button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateChoice {
    /// Acknowledgement for the button press
    pub ack: String,
    /// Next prompt, when the choice was accepted
    pub reply: Option<Reply>,
}

/// Result of feeding one input to a session
enum Advance {
    Next,
    Retry(Reply),
    Commit(NewEvent),
}

/// Owns the per-owner sessions and drives them to a stored event
#[derive(Clone)]
pub struct Conversation {
    store: Arc<dyn EventStore>,
    sessions: SessionStore,
}

impl Conversation {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Begin a new creation session, discarding any unfinished one
    pub async fn start_create(&self, owner_id: OwnerId) -> Reply {
        let mut slot = self.sessions.lock(owner_id).await;
        if slot.is_some() {
            debug!("Discarding unfinished session for owner {owner_id}");
        }
        *slot = Some(Session::new());
        info!("📝 Started event creation for owner {owner_id}");

        Reply::text("Let's create an event.\nPick a date or type it (YYYY-MM-DD):")
            .with_actions(&DATE_ACTIONS)
    }

    /// Replace an existing event through the creation flow
    ///
    /// The event is deleted first; the new session is only created once the
    /// delete succeeded.
    pub async fn start_update(&self, owner_id: OwnerId, id: EventId) -> Reply {
        let reply = self.reseed_from_event(owner_id, id).await;
        self.sessions.release(owner_id);
        reply
    }

    async fn reseed_from_event(&self, owner_id: OwnerId, id: EventId) -> Reply {
        let mut slot = self.sessions.lock(owner_id).await;

        let event = match self.store.get_by_id(owner_id, id).await {
            Ok(Some(event)) => event,
            Ok(None) => return Reply::text(format!("Event #{id} not found.")),
            Err(e) => {
                error!("Failed to load event {id} for owner {owner_id}: {e}");
                return Reply::text("Something went wrong while loading the event.");
            }
        };

        match self.store.delete_by_id(owner_id, id).await {
            Ok(true) => {}
            Ok(false) => return Reply::text(format!("Event #{id} not found.")),
            Err(e) => {
                error!("Failed to delete event {id} before editing: {e}");
                return Reply::text("Something went wrong while preparing the event for editing.");
            }
        }

        let seed = Seed::from(&event);
        let current_date = event.start_time.with_timezone(&Local).format(DATE_FORMAT);
        *slot = Some(Session::seeded(seed));
        info!("✏️ Editing event {id} ('{}') for owner {owner_id}", event.title);

        Reply::text(format!(
            "Updating \"{}\".\nPick a date or type it (YYYY-MM-DD). Current: {current_date}",
            event.title
        ))
        .with_actions(&DATE_ACTIONS)
    }

    /// Apply a Today/Tomorrow button
    ///
    /// Only accepted while the owner's session waits for a date; anything else
    /// is rejected without touching state.
    pub async fn choose_date(&self, owner_id: OwnerId, choice: QuickDate, today: NaiveDate) -> DateChoice {
        let Some(mut slot) = self.sessions.lock_existing(owner_id).await else {
            return DateChoice {
                ack: NO_ACTIVE_STEP.to_string(),
                reply: None,
            };
        };

        match slot.as_mut() {
            Some(session) if session.step == Step::Date => {
                let date = choice.resolve(today);
                session.step = Step::StartTime { date };
                debug!("Owner {owner_id} picked {date} via quick choice");

                let ack = match choice {
                    QuickDate::Today => "You chose today.",
                    QuickDate::Tomorrow => "You chose tomorrow.",
                };
                DateChoice {
                    ack: ack.to_string(),
                    reply: Some(prompt(session)),
                }
            }
            _ => DateChoice {
                ack: NO_ACTIVE_STEP.to_string(),
                reply: None,
            },
        }
    }

    /// Feed free text to the owner's session
    ///
    /// Returns `None` when the owner has no session in progress.
    pub async fn handle_input(&self, owner_id: OwnerId, text: &str) -> Option<Reply> {
        let mut slot = self.sessions.lock_existing(owner_id).await?;
        if slot.is_none() {
            drop(slot);
            self.sessions.release(owner_id);
            return None;
        }
        let session = slot.as_mut()?;

        let step_number = session.step.number();
        let new_event = match advance(session, owner_id, text.trim()) {
            Advance::Next => {
                debug!("Owner {owner_id} advanced from step {step_number} to {}", session.step.number());
                return Some(prompt(session));
            }
            Advance::Retry(reply) => {
                debug!("Owner {owner_id} sent invalid input at step {step_number}");
                return Some(reply);
            }
            Advance::Commit(new_event) => new_event,
        };

        *slot = None;

        let reply = match self.store.create(&new_event).await {
            Ok(id) => {
                info!("✅ Created event {id} '{}' for owner {owner_id}", new_event.title);
                Reply::text(summary(id, &new_event))
            }
            Err(e) => {
                error!("Failed to store event for owner {owner_id}: {e}");
                Reply::text("Something went wrong while saving the event.")
            }
        };

        drop(slot);
        self.sessions.release(owner_id);
        Some(reply)
    }
}

fn advance(session: &mut Session, owner_id: OwnerId, input: &str) -> Advance {
    match session.step.clone() {
        Step::Date => match parse_date(input) {
            Some(date) => {
                session.step = Step::StartTime { date };
                Advance::Next
            }
            None => Advance::Retry(
                Reply::text("Couldn't read that date. Use YYYY-MM-DD or pick one:")
                    .with_actions(&DATE_ACTIONS),
            ),
        },
        Step::StartTime { date } => {
            let Ok(time) = NaiveTime::parse_from_str(input, TIME_FORMAT) else {
                return Advance::Retry(Reply::text("Invalid time format, use HH:MM."));
            };
            match local_to_utc(date, time) {
                Some(start) => {
                    session.step = Step::Duration { start };
                    Advance::Next
                }
                None => Advance::Retry(Reply::text(
                    "That time doesn't exist on this date (clock change). Enter another time (HH:MM):",
                )),
            }
        }
        Step::Duration { start } => match parse_minutes(input) {
            Some(minutes) if minutes > 0 => match u32::try_from(minutes) {
                Ok(duration_minutes) if end_time_after(start, duration_minutes).is_some() => {
                    session.step = Step::NotifyBefore {
                        start,
                        duration_minutes,
                    };
                    Advance::Next
                }
                _ => Advance::Retry(Reply::text(
                    "That duration is too long. Enter the duration in minutes:",
                )),
            },
            _ => Advance::Retry(Reply::text(
                "Please enter the duration as a positive number of minutes.",
            )),
        },
        Step::NotifyBefore {
            start,
            duration_minutes,
        } => match parse_minutes(input) {
            Some(minutes) => {
                let notify_before_minutes = u32::try_from(minutes.max(0)).unwrap_or(u32::MAX);
                session.step = Step::Title {
                    start,
                    duration_minutes,
                    notify_before_minutes,
                };
                Advance::Next
            }
            None => Advance::Retry(Reply::text(
                "Please enter a number: how many minutes before the start to remind you.",
            )),
        },
        Step::Title {
            start,
            duration_minutes,
            notify_before_minutes,
        } => {
            if input.is_empty() {
                return Advance::Retry(Reply::text("The title can't be empty. Enter the event title:"));
            }
            match NewEvent::new(owner_id, input, start, duration_minutes, notify_before_minutes) {
                Some(new_event) => Advance::Commit(new_event),
                None => {
                    session.step = Step::Duration { start };
                    Advance::Retry(Reply::text(
                        "That event would end too far in the future. Enter a shorter duration in minutes:",
                    ))
                }
            }
        }
    }
}

/// Strict `YYYY-MM-DD`: four-digit year, no sign
fn parse_date(input: &str) -> Option<NaiveDate> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

fn parse_minutes(input: &str) -> Option<i64> {
    input.parse::<i64>().ok()
}

/// Prompt for the session's current step
fn prompt(session: &Session) -> Reply {
    let seed = &session.seed;
    match &session.step {
        Step::Date => Reply::text("Pick a date or type it (YYYY-MM-DD):").with_actions(&DATE_ACTIONS),
        Step::StartTime { .. } => Reply::text(with_hint(
            "Enter the start time (HH:MM):",
            seed.start.map(format_clock),
        )),
        Step::Duration { .. } => Reply::text(with_hint(
            "Enter the duration in minutes:",
            seed.duration_minutes.map(|m| m.to_string()),
        )),
        Step::NotifyBefore { .. } => Reply::text(with_hint(
            "How many minutes before the start should I remind you?",
            edited(seed).then(|| seed.notify_before_minutes.to_string()),
        )),
        Step::Title { .. } => Reply::text(with_hint(TITLE_PROMPT, seed.title.clone())),
    }
}

fn edited(seed: &Seed) -> bool {
    seed.title.is_some()
}

fn with_hint(question: &str, current: Option<String>) -> String {
    match current {
        Some(value) => format!("{question} (current: {value})"),
        None => question.to_string(),
    }
}

fn summary(id: EventId, event: &NewEvent) -> String {
    format!(
        "Event created (ID={id}):\n{}\nStart: {}\nDuration: {} minutes\nReminder: {} min before",
        event.title,
        format_local(event.start_time),
        (event.end_time - event.start_time).num_minutes(),
        event.notify_before_minutes
    )
}

fn format_local(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
