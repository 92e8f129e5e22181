//! # Command System
//!
//! Text commands (`/create`, `/list`, …) typed into the chat.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod parse;

pub use crate::command_handler::CommandHandler;
pub use parse::{IdArg, TextCommand};
