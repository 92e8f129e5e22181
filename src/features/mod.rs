//! # Features
//!
//! Each feature lives in its own module with a version header.
//!
//! | Feature | Purpose |
//! |---------|---------|
//! | `events` | Event records and the storage contract |
//! | `conversation` | Step-by-step creation and editing |
//! | `reminders` | Periodic reminder delivery |

pub mod conversation;
pub mod events;
pub mod reminders;

pub use conversation::{Conversation, QuickDate, SessionStore};
pub use events::{Event, EventStore, NewEvent, StoreError};
pub use reminders::{DiscordNotifier, Notifier, ReminderScheduler};
