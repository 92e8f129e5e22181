//! # Core Module
//!
//! Configuration, transport-neutral replies and message chunking.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add reply module (`Reply`, `Action`, `Responder`)
//! - 1.1.0: Add response module with message chunking
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod reply;
pub mod response;

pub use config::Config;
pub use reply::{Action, Reply, Responder};
pub use response::{chunk_text, split_reply, MESSAGE_LIMIT};
