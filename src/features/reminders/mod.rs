//! # Feature: Reminders
//!
//! Scans stored events on a fixed interval and reminds each owner once, shortly
//! before the event starts.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Cancellable scheduler, delivery behind `Notifier`
//! - 1.0.0: Initial release

pub mod notifier;
pub mod scheduler;

pub use notifier::{format_reminder, DiscordNotifier, Notifier};
pub use scheduler::{ReminderScheduler, TickReport};
