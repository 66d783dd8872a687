//! Test doubles for the core ports.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    completion::CompletionClient,
    errors::Error,
    messaging::{
        port::Interaction,
        types::{MessagingCapabilities, Reply, SessionStats},
    },
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Defer,
    Reply(Reply),
    Edit(String),
    FollowUp(Reply),
}

#[derive(Default)]
pub struct FakeInteraction {
    sent: Mutex<Vec<Sent>>,
    fail_defer: bool,
    fail_edit: bool,
    stats: SessionStats,
}

impl FakeInteraction {
    pub fn failing_defer() -> Self {
        Self {
            fail_defer: true,
            ..Default::default()
        }
    }

    pub fn failing_edit() -> Self {
        Self {
            fail_edit: true,
            ..Default::default()
        }
    }

    pub fn with_stats(stats: SessionStats) -> Self {
        Self {
            stats,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Edit(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn follow_ups(&self) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::FollowUp(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn push(&self, s: Sent) {
        self.sent.lock().unwrap().push(s);
    }
}

#[async_trait]
impl Interaction for FakeInteraction {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities::default()
    }

    async fn defer(&self) -> Result<()> {
        if self.fail_defer {
            return Err(Error::Messaging("defer rejected".to_string()));
        }
        self.push(Sent::Defer);
        Ok(())
    }

    async fn reply(&self, reply: Reply) -> Result<()> {
        self.push(Sent::Reply(reply));
        Ok(())
    }

    async fn edit_reply(&self, content: &str) -> Result<()> {
        if self.fail_edit {
            return Err(Error::Messaging("edit rejected".to_string()));
        }
        self.push(Sent::Edit(content.to_string()));
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.push(Sent::FollowUp(reply));
        Ok(())
    }

    async fn session_stats(&self) -> SessionStats {
        self.stats.clone()
    }
}

type Respond = Box<dyn Fn() -> Result<String> + Send + Sync>;

pub struct FakeCompletion {
    respond: Respond,
    models: Vec<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeCompletion {
    pub fn answering(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(Box::new(move || Ok(text.clone())))
    }

    pub fn failing(make: fn() -> Error) -> Self {
        Self::new(Box::new(move || Err(make())))
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// `(message, model)` pairs passed to `chat`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn new(respond: Respond) -> Self {
        Self {
            respond,
            models: vec!["gpt-4o-mini".to_string()],
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn chat(&self, message: &str, model: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((message.to_string(), model.to_string()));
        (self.respond)()
    }

    async fn chat_with_system(&self, message: &str, _system: &str, model: &str) -> Result<String> {
        self.chat(message, model).await
    }

    async fn list_models(&self) -> Vec<String> {
        self.models.clone()
    }

    async fn test_connection(&self) -> bool {
        (self.respond)().is_ok()
    }
}
