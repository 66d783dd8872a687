use async_trait::async_trait;

use crate::{
    messaging::types::{MessagingCapabilities, Reply, SessionStats},
    Result,
};

/// Reply channel for one inbound command interaction.
///
/// Discord is the first implementation. The platform accepts exactly one
/// initial response (`defer` or `reply`); everything after that is an edit
/// of the initial response or a follow-up.
#[async_trait]
pub trait Interaction: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Acknowledge with a "thinking" placeholder.
    async fn defer(&self) -> Result<()>;

    /// Send the initial response directly.
    async fn reply(&self, reply: Reply) -> Result<()>;

    /// Replace the placeholder/initial response text.
    async fn edit_reply(&self, content: &str) -> Result<()>;

    async fn follow_up(&self, reply: Reply) -> Result<()>;

    async fn session_stats(&self) -> SessionStats;
}
