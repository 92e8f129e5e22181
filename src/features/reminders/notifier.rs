//! Reminder formatting and delivery
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Delivery moved behind the `Notifier` trait
//! - 1.0.0: Initial Discord delivery

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::features::events::{Event, OwnerId};

/// Outbound channel for reminders
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, owner_id: OwnerId, text: &str) -> Result<()>;
}

/// Reminder text: lead time, title, and local start/end clock times
pub fn format_reminder(event: &Event) -> String {
    format!(
        "⏰ Reminder!\nStarting in {} min:\n**{}**\nTime: {} - {}",
        event.notify_before_minutes,
        event.title,
        event.start_clock(),
        event.end_clock()
    )
}

/// Sends reminders as plain messages to the owner's Discord channel
#[derive(Clone)]
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, owner_id: OwnerId, text: &str) -> Result<()> {
        let channel = ChannelId(owner_id as u64);
        channel.say(&self.http, text).await?;
        debug!("Delivered reminder to channel {owner_id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::events::{local_to_utc, NewEvent};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_format_reminder() {
        let day = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let start = local_to_utc(day, NaiveTime::from_hms_opt(14, 30, 0).unwrap()).unwrap();
        let event = NewEvent::new(5, "Standup", start, 60, 10).unwrap().into_event(1);

        assert_eq!(
            format_reminder(&event),
            "⏰ Reminder!\nStarting in 10 min:\n**Standup**\nTime: 14:30 - 15:30"
        );
    }
}
