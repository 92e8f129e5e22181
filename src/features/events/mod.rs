//! # Feature: Events
//!
//! Calendar event records and the storage contract used by the conversation
//! flow and the reminder scheduler.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod model;
pub mod store;

pub use model::{day_bounds, end_time_after, format_clock, local_to_utc, Event, EventId, NewEvent, OwnerId};
pub use store::{EventStore, StoreError};
