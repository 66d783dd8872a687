//! Completion port: the seam between the command handlers and the REST
//! completion backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single-turn completion request. Not persisted.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub message: String,
    pub system: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Conversation entries in wire order: system (if any) first, then user.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(2);
        if let Some(sys) = &self.system {
            out.push(ChatMessage::system(sys.clone()));
        }
        out.push(ChatMessage::user(self.message.clone()));
        out
    }
}

/// Completion backend used by the command handlers.
///
/// `chat`/`chat_with_system` fail closed with a classified [`crate::Error`];
/// `list_models` and `test_connection` fail open and never return an error.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn chat(&self, message: &str, model: &str) -> Result<String>;

    async fn chat_with_system(&self, message: &str, system: &str, model: &str) -> Result<String>;

    async fn list_models(&self) -> Vec<String>;

    async fn test_connection(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_entry_precedes_user_entry() {
        let req = CompletionRequest {
            message: "hi".to_string(),
            system: Some("be brief".to_string()),
            model: "gpt-4o".to_string(),
            max_tokens: 10,
            temperature: 0.0,
        };
        let msgs = req.messages();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0], ChatMessage::system("be brief"));
        assert_eq!(msgs[1], ChatMessage::user("hi"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let v = serde_json::to_value(ChatMessage::user("x")).unwrap();
        assert_eq!(v, serde_json::json!({"role": "user", "content": "x"}));
    }
}
