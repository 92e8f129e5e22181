//! Transport-neutral replies and button actions
//!
//! Handlers produce [`Reply`] values and hand them to a [`Responder`]; the bot
//! binary renders them as Discord messages with an action row of buttons.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Button actions offered alongside replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    DateToday,
    DateTomorrow,
    DeleteAllToday,
}

impl Action {
    /// Identifier carried in the button's `custom_id`
    pub fn id(self) -> &'static str {
        match self {
            Action::DateToday => "date_today",
            Action::DateTomorrow => "date_tomorrow",
            Action::DeleteAllToday => "delete_all_today",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Action::DateToday => "📅 Today",
            Action::DateTomorrow => "➡️ Tomorrow",
            Action::DeleteAllToday => "🗑️ Delete all today",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date_today" => Ok(Action::DateToday),
            "date_tomorrow" => Ok(Action::DateTomorrow),
            "delete_all_today" => Ok(Action::DeleteAllToday),
            other => Err(anyhow::anyhow!("unknown action: {other}")),
        }
    }
}

/// A message to send back to the owner's chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub actions: Vec<Action>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_actions(mut self, actions: &[Action]) -> Self {
        self.actions.extend_from_slice(actions);
        self
    }
}

/// Sink for the answers to one inbound input
#[async_trait]
pub trait Responder: Send + Sync {
    /// Acknowledge a button press; shown only to the user who pressed it
    async fn acknowledge(&self, text: &str) -> Result<()>;

    /// Send a message to the chat
    async fn reply(&self, reply: Reply) -> Result<()>;
}
