use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::parse::{IdArg, TextCommand};
use crate::core::reply::{Action, Reply, Responder};
use crate::core::response::split_reply;
use crate::features::conversation::Conversation;
use crate::features::events::{Event, EventStore, OwnerId};

const START_TEXT: &str = "Hi! I'm a planner bot.\n\
    Commands:\n\
    /create - create an event step by step\n\
    /list - show today's events\n\
    /delete <id> - delete an event\n\
    /update <id> - change an event\n\
    /help - help";

const HELP_TEXT: &str = "Help:\n\
    /create - start creating an event\n\
    /list - show today's events\n\
    /delete <id> - delete an event\n\
    /update <id> - change an event";

/// Routes chat messages to commands or the owner's conversation
#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<dyn EventStore>,
    conversation: Conversation,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn EventStore>, conversation: Conversation) -> Self {
        Self {
            store,
            conversation,
        }
    }

    /// Handle one chat message from `owner_id`
    ///
    /// Messages starting with `/` are commands; anything else feeds the
    /// owner's creation session and is ignored when there is none.
    pub async fn handle_message(
        &self,
        owner_id: OwnerId,
        content: &str,
        today: NaiveDate,
        responder: &dyn Responder,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        info!(
            "[{request_id}] 📥 Message received | Owner: {owner_id} | Content: '{}'",
            content.chars().take(100).collect::<String>()
        );

        match TextCommand::parse(content) {
            Some(command) => {
                self.handle_text_command(owner_id, command, today, responder, request_id)
                    .await
            }
            None => match self.conversation.handle_input(owner_id, content).await {
                Some(reply) => {
                    debug!("[{request_id}] 💬 Session input handled");
                    responder.reply(reply).await
                }
                None => {
                    debug!("[{request_id}] No active session, ignoring message");
                    Ok(())
                }
            },
        }
    }

    async fn handle_text_command(
        &self,
        owner_id: OwnerId,
        command: TextCommand,
        today: NaiveDate,
        responder: &dyn Responder,
        request_id: Uuid,
    ) -> Result<()> {
        debug!("[{request_id}] 🎯 Processing text command: {command:?}");

        match command {
            TextCommand::Start => responder.reply(Reply::text(START_TEXT)).await,
            TextCommand::Help => responder.reply(Reply::text(HELP_TEXT)).await,
            TextCommand::List => self.handle_list(owner_id, today, responder, request_id).await,
            TextCommand::Create => {
                let reply = self.conversation.start_create(owner_id).await;
                responder.reply(reply).await
            }
            TextCommand::Delete(arg) => {
                let reply = match arg {
                    IdArg::Missing => Reply::text("Specify the event ID: /delete 123"),
                    IdArg::Invalid(_) => Reply::text("Invalid ID."),
                    IdArg::Id(id) => match self.store.delete_by_id(owner_id, id).await {
                        Ok(true) => {
                            info!("[{request_id}] 🗑️ Deleted event {id} for owner {owner_id}");
                            Reply::text(format!("Event #{id} deleted."))
                        }
                        Ok(false) => Reply::text(format!("Event #{id} not found.")),
                        Err(e) => {
                            error!("[{request_id}] Failed to delete event {id}: {e}");
                            Reply::text("Something went wrong while deleting the event.")
                        }
                    },
                };
                responder.reply(reply).await
            }
            TextCommand::Update(arg) => {
                let reply = match arg {
                    IdArg::Missing => Reply::text("Specify the event ID: /update 123"),
                    IdArg::Invalid(_) => Reply::text("Invalid ID."),
                    IdArg::Id(id) => self.conversation.start_update(owner_id, id).await,
                };
                responder.reply(reply).await
            }
            TextCommand::Unknown(name) => {
                debug!("[{request_id}] ❓ Unknown command: {name}");
                responder
                    .reply(Reply::text("Unknown command. Use /help to see available commands."))
                    .await
            }
        }
    }

    async fn handle_list(
        &self,
        owner_id: OwnerId,
        today: NaiveDate,
        responder: &dyn Responder,
        request_id: Uuid,
    ) -> Result<()> {
        let events = match self.store.list_for_owner_on_day(owner_id, today).await {
            Ok(events) => events,
            Err(e) => {
                error!("[{request_id}] Failed to list events for owner {owner_id}: {e}");
                return responder
                    .reply(Reply::text("Something went wrong while loading your events."))
                    .await;
            }
        };

        if events.is_empty() {
            return responder.reply(Reply::text("No events for today.")).await;
        }

        let reply = Reply::text(format_day_listing(&events)).with_actions(&[Action::DeleteAllToday]);
        for part in split_reply(reply) {
            responder.reply(part).await?;
        }
        Ok(())
    }
}

/// `N) id | title (HH:MM - HH:MM)` per event, under a heading
fn format_day_listing(events: &[Event]) -> String {
    let mut listing = String::from("Your events for today:");
    for (index, event) in events.iter().enumerate() {
        listing.push_str(&format!(
            "\n{}) {} | {} ({} - {})",
            index + 1,
            event.id,
            event.title,
            event.start_clock(),
            event.end_clock()
        ));
    }
    listing
}
