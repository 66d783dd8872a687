//! Slash-command model: invocations, handler trait, and the three built-in commands.

pub mod ai;
pub mod dispatcher;
pub mod info;
pub mod models;
pub mod registry;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    domain::{ChannelId, GuildId, UserId},
    errors::Error,
    messaging::{port::Interaction, responder::Responder},
    Result,
};

pub use dispatcher::{build_dispatcher, DispatchOutcome, Dispatcher};
pub use registry::CommandRegistry;

/// One inbound command, created per interaction and dropped after handling.
pub struct Invocation {
    pub name: String,
    pub args: HashMap<String, String>,
    pub guild_id: Option<GuildId>,
    pub channel_id: Option<ChannelId>,
    pub user_id: Option<UserId>,
    pub responder: Responder,
}

impl Invocation {
    pub fn new(
        name: impl Into<String>,
        args: HashMap<String, String>,
        interaction: Arc<dyn Interaction>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            guild_id: None,
            channel_id: None,
            user_id: None,
            responder: Responder::new(interaction),
        }
    }

    pub fn in_channel(mut self, guild_id: Option<GuildId>, channel_id: ChannelId) -> Self {
        self.guild_id = guild_id;
        self.channel_id = Some(channel_id);
        self
    }

    pub fn from_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Argument value, with blank strings treated as absent.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn required_arg(&self, name: &str) -> Result<&str> {
        self.arg(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }
}

/// Static description of a command, used for platform registration.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
}

/// A string option. Non-empty `choices` restrict input to that set.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub choices: Vec<OptionChoice>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionChoice {
    pub name: String,
    pub value: String,
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    async fn handle(&self, inv: &Invocation) -> Result<()>;
}
