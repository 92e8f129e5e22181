//! Button interactions
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::Arc;

use crate::core::reply::{Action, Reply, Responder};
use crate::features::conversation::{Conversation, QuickDate};
use crate::features::events::{EventStore, OwnerId};

/// Handler for all message component interactions
#[derive(Clone)]
pub struct MessageComponentHandler {
    store: Arc<dyn EventStore>,
    conversation: Conversation,
}

impl MessageComponentHandler {
    pub fn new(store: Arc<dyn EventStore>, conversation: Conversation) -> Self {
        Self {
            store,
            conversation,
        }
    }

    /// Handle a button press identified by its `custom_id`
    pub async fn handle_component_interaction(
        &self,
        owner_id: OwnerId,
        custom_id: &str,
        today: NaiveDate,
        responder: &dyn Responder,
    ) -> Result<()> {
        info!("Processing component interaction: {custom_id} from owner: {owner_id}");

        let action = match custom_id.parse::<Action>() {
            Ok(action) => action,
            Err(_) => {
                warn!("Unknown component id: {custom_id}");
                return responder.acknowledge("Unknown action.").await;
            }
        };

        match action {
            Action::DateToday => self.handle_date_choice(owner_id, QuickDate::Today, today, responder).await,
            Action::DateTomorrow => {
                self.handle_date_choice(owner_id, QuickDate::Tomorrow, today, responder)
                    .await
            }
            Action::DeleteAllToday => self.handle_delete_all_today(owner_id, today, responder).await,
        }
    }

    async fn handle_date_choice(
        &self,
        owner_id: OwnerId,
        choice: QuickDate,
        today: NaiveDate,
        responder: &dyn Responder,
    ) -> Result<()> {
        let outcome = self.conversation.choose_date(owner_id, choice, today).await;
        responder.acknowledge(&outcome.ack).await?;
        if let Some(reply) = outcome.reply {
            responder.reply(reply).await?;
        }
        Ok(())
    }

    /// Acknowledge first, then delete every event starting today
    async fn handle_delete_all_today(
        &self,
        owner_id: OwnerId,
        today: NaiveDate,
        responder: &dyn Responder,
    ) -> Result<()> {
        responder.acknowledge("🗑️ Deleting today's events...").await?;

        let reply = match self.store.delete_all_for_owner_on_day(owner_id, today).await {
            Ok(count) => {
                info!("🗑️ Deleted {count} events for owner {owner_id} on {today}");
                Reply::text("All of today's events were deleted.")
            }
            Err(e) => {
                error!("Failed to delete today's events for owner {owner_id}: {e}");
                Reply::text("Something went wrong while deleting today's events.")
            }
        };
        responder.reply(reply).await
    }
}
