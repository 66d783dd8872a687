use std::time::Duration;

use chrono::{DateTime, Utc};

/// Discord's hard per-message ceiling (characters).
pub const MESSAGE_LIMIT: usize = 2000;

/// Chunk size used when a response has to be split; leaves room for the
/// model label and continuation marker.
pub const CHUNK_LIMIT: usize = 1900;

/// An outbound initial reply or follow-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub card: Option<InfoCard>,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            card: None,
            ephemeral: true,
        }
    }

    pub fn card(card: InfoCard) -> Self {
        Self {
            content: None,
            card: Some(card),
            ephemeral: false,
        }
    }
}

/// Platform-neutral rich card (rendered as an embed on Discord).
#[derive(Clone, Debug, PartialEq)]
pub struct InfoCard {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<CardField>,
    pub footer: Option<CardFooter>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Live values read from the gateway session at reply time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionStats {
    pub guild_count: usize,
    pub latency: Option<Duration>,
    pub avatar_url: Option<String>,
}

/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

impl Default for MessagingCapabilities {
    fn default() -> Self {
        Self {
            max_message_len: MESSAGE_LIMIT,
        }
    }
}
