//! # Feature: Conversation
//!
//! Multi-step event creation and editing driven by chat input and date buttons.
//! One session per owner, held in memory only.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Edit flow hints, stricter validation
//! - 1.1.0: Tagged steps and per-owner session locking
//! - 1.0.0: Initial release

pub mod flow;
pub mod session;

pub use flow::{Conversation, DateChoice, QuickDate, NO_ACTIVE_STEP};
pub use session::{Seed, Session, SessionStore, Step, DEFAULT_NOTIFY_BEFORE_MINUTES};
