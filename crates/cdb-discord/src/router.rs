use std::sync::Arc;

use async_trait::async_trait;
use serenity::{
    all::{
        ActivityData, ApplicationId, Client, Command, CommandInteraction, Context, CreateCommand,
        EventHandler, GatewayIntents, GuildId as DiscordGuildId, Interaction as GatewayEvent,
        Ready,
    },
    Error as SerenityError,
};
use tracing::{debug, error, info, warn};

use cdb_core::{
    commands::{Dispatcher, Invocation},
    config::{CommandScope, Config},
    domain::{ChannelId, GuildId, UserId},
};

use crate::{create_command, string_args, DiscordInteraction, ShardManagerContainer};

pub const PRESENCE: &str = "AI ile sohbet | /ai";

struct Handler {
    dispatcher: Dispatcher,
    scope: CommandScope,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "connected to discord gateway"
        );

        let commands = self
            .dispatcher
            .definitions()
            .iter()
            .map(create_command)
            .collect::<Vec<_>>();

        match register_commands(&ctx, self.scope, commands).await {
            Ok(n) => info!(count = n, scope = ?self.scope, "slash commands registered"),
            Err(e) => error!(scope = ?self.scope, error = %e, "slash command registration failed"),
        }

        ctx.set_activity(Some(ActivityData::playing(PRESENCE)));
    }

    async fn interaction_create(&self, ctx: Context, interaction: GatewayEvent) {
        let GatewayEvent::Command(command) = interaction else {
            return;
        };

        let inv = invocation(ctx, command);
        let name = inv.name.clone();
        let outcome = self.dispatcher.dispatch(inv).await;
        debug!(command = %name, ?outcome, "interaction finished");
    }
}

fn invocation(ctx: Context, command: CommandInteraction) -> Invocation {
    let name = command.data.name.clone();
    let args = string_args(&command.data.options);
    let guild = command.guild_id.map(|g| GuildId(g.get()));
    let channel = ChannelId(command.channel_id.get());
    let user = UserId(command.user.id.get());

    Invocation::new(name, args, Arc::new(DiscordInteraction::new(ctx, command)))
        .in_channel(guild, channel)
        .from_user(user)
}

async fn register_commands(
    ctx: &Context,
    scope: CommandScope,
    commands: Vec<CreateCommand>,
) -> Result<usize, SerenityError> {
    let registered = match scope {
        CommandScope::Guild(id) => {
            DiscordGuildId::new(id)
                .set_commands(&ctx.http, commands)
                .await?
        }
        CommandScope::Global => {
            warn!("no guild id configured; global commands can take up to an hour to appear");
            Command::set_global_commands(&ctx.http, commands).await?
        }
    };
    Ok(registered.len())
}

/// Connect to the gateway and serve interactions until the client stops.
pub async fn run(cfg: Arc<Config>, dispatcher: Dispatcher) -> anyhow::Result<()> {
    let handler = Handler {
        dispatcher,
        scope: cfg.command_scope(),
    };

    let mut builder = Client::builder(&cfg.bot.token, GatewayIntents::GUILDS).event_handler(handler);
    if let Some(id) = cfg.application_id() {
        builder = builder.application_id(ApplicationId::new(id));
    }
    let mut client = builder.await?;

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
    }

    if let Err(e) = client.start().await {
        error!(error = %e, "discord client stopped");
        anyhow::bail!("discord client error: {e}");
    }

    Ok(())
}
