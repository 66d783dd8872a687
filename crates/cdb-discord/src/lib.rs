//! Discord adapter (serenity).
//!
//! This crate implements the `cdb-core` Interaction port over Discord
//! application-command interactions.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use serenity::{
    all::{
        CommandDataOption, CommandInteraction, CommandOptionType, Context, CreateCommand,
        CreateCommandOption, CreateEmbed, CreateEmbedFooter, CreateInteractionResponse,
        CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
        EditInteractionResponse, Timestamp,
    },
    gateway::ShardManager,
    prelude::TypeMapKey,
};

pub mod router;

use cdb_core::{
    commands::CommandDefinition,
    errors::Error,
    messaging::{
        port::Interaction,
        types::{InfoCard, MessagingCapabilities, Reply, SessionStats},
    },
    Result,
};

/// Type-map slot for the shard manager, read back when reporting latency.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// One slash-command interaction, answered through serenity's HTTP client.
#[derive(Clone)]
pub struct DiscordInteraction {
    ctx: Context,
    command: CommandInteraction,
}

impl DiscordInteraction {
    pub fn new(ctx: Context, command: CommandInteraction) -> Self {
        Self { ctx, command }
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::Messaging(format!("discord error: {e}"))
    }

    async fn shard_latency(&self) -> Option<std::time::Duration> {
        let manager = {
            let data = self.ctx.data.read().await;
            data.get::<ShardManagerContainer>()?.clone()
        };
        let runners = manager.runners.lock().await;
        runners.get(&self.ctx.shard_id).and_then(|r| r.latency)
    }
}

#[async_trait]
impl Interaction for DiscordInteraction {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities::default()
    }

    async fn defer(&self) -> Result<()> {
        self.command
            .defer(&self.ctx)
            .await
            .map_err(Self::map_err)
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        let mut msg = CreateInteractionResponseMessage::new().ephemeral(reply.ephemeral);
        if let Some(content) = reply.content {
            msg = msg.content(content);
        }
        if let Some(card) = &reply.card {
            msg = msg.embed(embed(card));
        }
        self.command
            .create_response(&self.ctx, CreateInteractionResponse::Message(msg))
            .await
            .map_err(Self::map_err)
    }

    async fn edit_reply(&self, content: &str) -> Result<()> {
        self.command
            .edit_response(&self.ctx, EditInteractionResponse::new().content(content))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        let mut msg = CreateInteractionResponseFollowup::new().ephemeral(reply.ephemeral);
        if let Some(content) = reply.content {
            msg = msg.content(content);
        }
        if let Some(card) = &reply.card {
            msg = msg.embed(embed(card));
        }
        self.command
            .create_followup(&self.ctx, msg)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn session_stats(&self) -> SessionStats {
        let guild_count = self.ctx.cache.guild_count();
        let avatar_url = Some(self.ctx.cache.current_user().face());
        SessionStats {
            guild_count,
            latency: self.shard_latency().await,
            avatar_url,
        }
    }
}

/// Registration payload for one command definition.
pub fn create_command(def: &CommandDefinition) -> CreateCommand {
    def.options.iter().fold(
        CreateCommand::new(&def.name).description(&def.description),
        |cmd, opt| {
            let option = opt.choices.iter().fold(
                CreateCommandOption::new(CommandOptionType::String, &opt.name, &opt.description)
                    .required(opt.required),
                |o, c| o.add_string_choice(&c.name, &c.value),
            );
            cmd.add_option(option)
        },
    )
}

pub fn embed(card: &InfoCard) -> CreateEmbed {
    let mut e = CreateEmbed::new()
        .title(&card.title)
        .description(&card.description)
        .color(card.color)
        .timestamp(Timestamp::from(card.timestamp));
    for f in &card.fields {
        e = e.field(&f.name, &f.value, f.inline);
    }
    if let Some(footer) = &card.footer {
        let mut ft = CreateEmbedFooter::new(&footer.text);
        if let Some(icon) = &footer.icon_url {
            ft = ft.icon_url(icon);
        }
        e = e.footer(ft);
    }
    e
}

/// String-valued top-level options keyed by name. Other option kinds are ignored.
pub fn string_args(options: &[CommandDataOption]) -> HashMap<String, String> {
    collect_args(
        options
            .iter()
            .map(|o| (o.name.as_str(), o.value.as_str())),
    )
}

fn collect_args<'a>(
    pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> HashMap<String, String> {
    pairs
        .into_iter()
        .filter_map(|(name, value)| Some((name.to_string(), value?.to_string())))
        .collect()
}
