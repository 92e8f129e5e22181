use anyhow::Result;
use chrono::Local;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use agenda::commands::CommandHandler;
use agenda::core::{Action, Config, Reply, Responder};
use agenda::database::Database;
use agenda::features::conversation::Conversation;
use agenda::features::events::{EventStore, OwnerId};
use agenda::features::reminders::{DiscordNotifier, ReminderScheduler};
use agenda::message_components::MessageComponentHandler;

/// Events are owned by the channel they were created in
fn owner_of(channel_id: ChannelId) -> OwnerId {
    channel_id.0 as OwnerId
}

fn render_actions<'a>(
    components: &'a mut CreateComponents,
    actions: &[Action],
) -> &'a mut CreateComponents {
    components.create_action_row(|row| {
        for action in actions {
            let style = match action {
                Action::DeleteAllToday => ButtonStyle::Danger,
                _ => ButtonStyle::Primary,
            };
            row.create_button(|button| {
                button
                    .custom_id(action.id())
                    .label(action.label())
                    .style(style)
            });
        }
        row
    })
}

async fn send_reply(http: &Http, channel_id: ChannelId, reply: Reply) -> Result<()> {
    channel_id
        .send_message(http, |message| {
            message.content(&reply.text);
            if !reply.actions.is_empty() {
                message.components(|components| render_actions(components, &reply.actions));
            }
            message
        })
        .await?;
    Ok(())
}

/// Replies to a plain chat message in its channel
struct MessageResponder {
    http: Arc<Http>,
    channel_id: ChannelId,
}

#[async_trait]
impl Responder for MessageResponder {
    async fn acknowledge(&self, text: &str) -> Result<()> {
        self.channel_id.say(&self.http, text).await?;
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        send_reply(&self.http, self.channel_id, reply).await
    }
}

/// Answers a button press with an ephemeral ack, then posts to the channel
struct ComponentResponder {
    http: Arc<Http>,
    component: MessageComponentInteraction,
}

#[async_trait]
impl Responder for ComponentResponder {
    async fn acknowledge(&self, text: &str) -> Result<()> {
        self.component
            .create_interaction_response(&self.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        send_reply(&self.http, self.component.channel_id, reply).await
    }
}

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let responder = MessageResponder {
            http: ctx.http.clone(),
            channel_id: msg.channel_id,
        };
        let today = Local::now().date_naive();

        if let Err(e) = self
            .command_handler
            .handle_message(owner_of(msg.channel_id), &msg.content, today, &responder)
            .await
        {
            error!("Error handling message: {e}");
            if let Err(why) = msg
                .channel_id
                .say(
                    &ctx.http,
                    "Sorry, I encountered an error processing your message.",
                )
                .await
            {
                error!("Failed to send error message: {why}");
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::MessageComponent(component) => {
                let owner_id = owner_of(component.channel_id);
                let custom_id = component.data.custom_id.clone();
                let responder = ComponentResponder {
                    http: ctx.http.clone(),
                    component,
                };
                let today = Local::now().date_naive();

                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(owner_id, &custom_id, today, &responder)
                    .await
                {
                    error!("Error handling component interaction '{custom_id}': {e}");
                }
            }
            other => {
                warn!("Ignoring unsupported interaction: {:?}", other.kind());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Agenda Discord Bot...");

    let database =
        Database::with_busy_timeout(&config.database_path, config.database_busy_timeout)
            .await
            .map_err(|e| {
                error!("Failed to open database at {}: {e}", config.database_path);
                e
            })?;
    info!("💾 Database ready at {}", config.database_path);

    let store: Arc<dyn EventStore> = Arc::new(database);
    let conversation = Conversation::new(store.clone());
    let command_handler = CommandHandler::new(store.clone(), conversation.clone());
    let component_handler = MessageComponentHandler::new(store.clone(), conversation);

    let handler = Handler {
        command_handler: Arc::new(command_handler),
        component_handler: Arc::new(component_handler),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the reminder scheduler
    let shutdown = CancellationToken::new();
    let notifier = Arc::new(DiscordNotifier::new(client.cache_and_http.http.clone()));
    let scheduler =
        ReminderScheduler::new(store, notifier).with_interval(config.reminder_interval);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown.clone()));

    // Stop the gateway and the scheduler on Ctrl+C
    let shard_manager = client.shard_manager.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        info!("🛑 Shutdown requested");
        signal_shutdown.cancel();
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    let result = client.start().await;

    shutdown.cancel();
    if let Err(e) = scheduler_handle.await {
        error!("Reminder scheduler task failed: {e}");
    }

    if let Err(why) = result {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    info!("👋 Bot stopped");
    Ok(())
}
