// Core layer - configuration and transport-neutral replies
pub mod core;

// Features layer - events, conversation, reminders
pub mod features;

// Storage
pub mod database;

// Application layer
pub mod command_handler;
pub mod commands;
pub mod message_components;

#[cfg(test)]
mod testing;

pub use core::Config;

pub use features::{
    // Conversation
    Conversation, QuickDate, SessionStore,
    // Events
    Event, EventStore, NewEvent, StoreError,
    // Reminders
    DiscordNotifier, Notifier, ReminderScheduler,
};
