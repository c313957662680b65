use ::tracing::error;
use anyhow::{Context, Error, Result};
use poise::samples::register_in_guild;
use serenity::all::{CreateAttachment, CreateMessage, FullEvent, GatewayIntents, Message};
use serenity::{Client, prelude::Context as SerenityContext};
use tracing::info;

use crate::client::AggregationClient;
use crate::command::start;
use crate::reply::{MESSAGE_LIMIT, Reply, pretty_json, reply_for, request_text};

mod client;
mod command;
mod reply;

pub struct Data {
    client: AggregationClient,
}

#[tokio::main]
async fn main() -> Result<()> {
    shared::init_tracing!()?;
    let config = shared::load_bot_config!()?;
    let intents = GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES;

    let api_url = config.api_url.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![start()],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(handle_event(ctx, event, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(api_url = %api_url, "Connected!");

                for guild_id in &ready.guilds {
                    register_in_guild(ctx, &framework.options().commands, guild_id.id).await?;
                }

                Ok(Data {
                    client: AggregationClient::new(api_url),
                })
            })
        })
        .build();

    let mut client = Client::builder(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}

async fn handle_event(ctx: &SerenityContext, event: &FullEvent, data: &Data) -> Result<(), Error> {
    if let FullEvent::Message { new_message } = event {
        if new_message.author.bot {
            return Ok(());
        }
        let bot_id = ctx.cache.current_user().id;
        let in_guild = new_message.guild_id.is_some();
        let Some(text) = request_text(&new_message.content, in_guild, bot_id) else {
            return Ok(());
        };
        let reply = reply_for(&data.client, &text).await;
        send_reply(ctx, new_message, &reply).await?;
    }
    Ok(())
}

/// Replies inline, or attaches the series as a file when it would not fit
/// in one message.
async fn send_reply(ctx: &SerenityContext, message: &Message, reply: &Reply) -> Result<()> {
    let text = reply.render();
    if text.chars().count() <= MESSAGE_LIMIT {
        message.reply(ctx, text).await?;
        return Ok(());
    }

    let builder = match reply {
        Reply::Aggregation(series) => CreateMessage::new()
            .content("Aggregation result:")
            .add_file(CreateAttachment::bytes(
                pretty_json(series).into_bytes(),
                "aggregation.json",
            )),
        Reply::Text(_) => {
            CreateMessage::new().content(text.chars().take(MESSAGE_LIMIT).collect::<String>())
        }
    };
    message
        .channel_id
        .send_message(ctx, builder.reference_message(message))
        .await?;
    Ok(())
}
