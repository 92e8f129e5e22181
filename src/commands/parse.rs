//! Text command parsing
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use crate::features::events::EventId;

/// The `<id>` argument of `/delete` and `/update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdArg {
    Missing,
    Invalid(String),
    Id(EventId),
}

impl IdArg {
    fn parse(args: &[&str]) -> Self {
        match args.first() {
            None => IdArg::Missing,
            Some(raw) => raw
                .parse::<EventId>()
                .map(IdArg::Id)
                .unwrap_or_else(|_| IdArg::Invalid(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    Start,
    Help,
    List,
    Create,
    Delete(IdArg),
    Update(IdArg),
    Unknown(String),
}

impl TextCommand {
    /// Parse a message starting with `/`; other messages are not commands
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        if !content.starts_with('/') {
            return None;
        }

        let parts: Vec<&str> = content.split_whitespace().collect();
        let (name, args) = parts.split_first()?;

        let command = match name.to_lowercase().as_str() {
            "/start" => TextCommand::Start,
            "/help" => TextCommand::Help,
            "/list" => TextCommand::List,
            "/create" => TextCommand::Create,
            "/delete" => TextCommand::Delete(IdArg::parse(args)),
            "/update" => TextCommand::Update(IdArg::parse(args)),
            _ => TextCommand::Unknown(name.to_string()),
        };
        Some(command)
    }
}
