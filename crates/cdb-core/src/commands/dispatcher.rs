use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    commands::{
        ai::AiCommand, info::InfoCommand, models::ModelsCommand, CommandDefinition,
        CommandRegistry, Invocation,
    },
    completion::CompletionClient,
    config::Config,
    domain::ChannelId,
    messaging::types::Reply,
};

/// Ephemeral notice for any failure that escapes a handler.
pub const FAULT_NOTICE: &str =
    "❌ Komut işlenirken bir hata oluştu. Lütfen daha sonra tekrar deneyin.";

/// Ephemeral notice for invocations outside the configured channel.
pub const WRONG_CHANNEL_NOTICE: &str = "⚠️ Bu bot yalnızca belirlenen kanalda kullanılabilir.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No handler registered under that name.
    Ignored,
    /// Outside the allowed channel.
    Rejected,
    /// The handler failed; a notice was attempted.
    Faulted,
}

/// Routes invocations to registered handlers and owns the failure boundary:
/// nothing a handler returns escapes `dispatch`.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    allowed_channel: Option<ChannelId>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            allowed_channel: None,
        }
    }

    pub fn with_allowed_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.allowed_channel = channel;
        self
    }

    pub fn definitions(&self) -> Vec<CommandDefinition> {
        self.registry.definitions()
    }

    pub async fn dispatch(&self, inv: Invocation) -> DispatchOutcome {
        let Some(handler) = self.registry.get(&inv.name) else {
            debug!(command = %inv.name, "ignoring unregistered command");
            return DispatchOutcome::Ignored;
        };

        if let (Some(allowed), Some(actual)) = (self.allowed_channel, inv.channel_id) {
            if allowed != actual {
                if let Err(e) = inv.responder.notify(Reply::ephemeral(WRONG_CHANNEL_NOTICE)).await {
                    error!(command = %inv.name, error = %e, "failed to send channel notice");
                }
                return DispatchOutcome::Rejected;
            }
        }

        info!(
            command = %inv.name,
            guild = ?inv.guild_id.map(|g| g.0),
            user = ?inv.user_id.map(|u| u.0),
            "handling command"
        );

        // A panic inside the handler comes back as a JoinError.
        let inv = Arc::new(inv);
        let task_inv = inv.clone();
        let result = tokio::spawn(async move { handler.handle(&task_inv).await }).await;

        let failure = match result {
            Ok(Ok(())) => return DispatchOutcome::Handled,
            Ok(Err(e)) => e.to_string(),
            Err(join) if join.is_panic() => "handler panicked".to_string(),
            Err(join) => join.to_string(),
        };

        error!(command = %inv.name, error = %failure, "command handler failed");
        if let Err(e) = inv.responder.notify(Reply::ephemeral(FAULT_NOTICE)).await {
            error!(command = %inv.name, error = %e, "failed to send error notice");
        }
        DispatchOutcome::Faulted
    }
}

/// The standard command set: `/ai`, `/models`, `/info`.
pub fn build_dispatcher(cfg: Arc<Config>, client: Arc<dyn CompletionClient>) -> Dispatcher {
    let mut registry = CommandRegistry::new();
    registry.register(AiCommand::new(cfg.clone(), client.clone()));
    registry.register(ModelsCommand::new(client));
    registry.register(InfoCommand::new());

    Dispatcher::new(Arc::new(registry)).with_allowed_channel(cfg.allowed_channel().map(ChannelId))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::{ai, CommandHandler},
        errors::Error,
        testing::{FakeCompletion, FakeInteraction, Sent},
        Result,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn test_config(extra_bot: &str) -> Arc<Config> {
        let raw = format!(
            r#"{{ "bot": {{ "token": "t", "clientId": "1"{extra_bot} }}, "api": {{ "cortexApiKey": "k" }} }}"#
        );
        Arc::new(Config::from_json(&raw).unwrap())
    }

    fn ai_invocation(fake: Arc<FakeInteraction>, message: &str) -> Invocation {
        let mut args = HashMap::new();
        args.insert(ai::MESSAGE_OPTION.to_string(), message.to_string());
        Invocation::new(ai::NAME, args, fake)
    }

    struct Exploding {
        after_defer: bool,
        panics: bool,
    }

    #[async_trait]
    impl CommandHandler for Exploding {
        fn definition(&self) -> CommandDefinition {
            CommandDefinition {
                name: "boom".to_string(),
                description: "fails".to_string(),
                options: Vec::new(),
            }
        }

        async fn handle(&self, inv: &Invocation) -> Result<()> {
            use crate::messaging::port::Interaction;
            if self.after_defer {
                inv.responder.defer().await?;
            }
            if self.panics {
                panic!("handler bug");
            }
            Err(Error::Messaging("kaboom".to_string()))
        }
    }

    fn exploding(after_defer: bool) -> Dispatcher {
        exploding_with(after_defer, false)
    }

    fn exploding_with(after_defer: bool, panics: bool) -> Dispatcher {
        let mut registry = CommandRegistry::new();
        registry.register(Exploding { after_defer, panics });
        Dispatcher::new(Arc::new(registry))
    }

    #[test]
    fn standard_set_registers_three_commands() {
        let d = build_dispatcher(test_config(""), Arc::new(FakeCompletion::answering("")));
        let names = d
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["ai", "info", "models"]);
    }

    #[tokio::test]
    async fn unknown_command_is_a_no_op() {
        let d = build_dispatcher(test_config(""), Arc::new(FakeCompletion::answering("")));
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new("weather", HashMap::new(), fake.clone());

        assert_eq!(d.dispatch(inv).await, DispatchOutcome::Ignored);
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn fault_before_ack_uses_reply() {
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new("boom", HashMap::new(), fake.clone());

        assert_eq!(exploding(false).dispatch(inv).await, DispatchOutcome::Faulted);
        assert_eq!(
            fake.sent(),
            vec![Sent::Reply(Reply::ephemeral(FAULT_NOTICE))]
        );
    }

    #[tokio::test]
    async fn fault_after_defer_uses_follow_up() {
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new("boom", HashMap::new(), fake.clone());

        assert_eq!(exploding(true).dispatch(inv).await, DispatchOutcome::Faulted);
        assert_eq!(
            fake.sent(),
            vec![Sent::Defer, Sent::FollowUp(Reply::ephemeral(FAULT_NOTICE))]
        );
    }

    #[tokio::test]
    async fn panic_after_defer_still_sends_notice() {
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new("boom", HashMap::new(), fake.clone());

        assert_eq!(
            exploding_with(true, true).dispatch(inv).await,
            DispatchOutcome::Faulted
        );
        assert_eq!(
            fake.sent(),
            vec![Sent::Defer, Sent::FollowUp(Reply::ephemeral(FAULT_NOTICE))]
        );
    }

    #[tokio::test]
    async fn panic_before_ack_replies_with_notice() {
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new("boom", HashMap::new(), fake.clone());

        assert_eq!(
            exploding_with(false, true).dispatch(inv).await,
            DispatchOutcome::Faulted
        );
        assert_eq!(
            fake.sent(),
            vec![Sent::Reply(Reply::ephemeral(FAULT_NOTICE))]
        );
    }

    #[tokio::test]
    async fn completion_failure_is_handled_without_fault() {
        let d = build_dispatcher(
            test_config(""),
            Arc::new(FakeCompletion::failing(|| Error::Unexpected)),
        );
        let fake = Arc::new(FakeInteraction::default());

        let outcome = d.dispatch(ai_invocation(fake.clone(), "hello")).await;

        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(
            fake.sent(),
            vec![Sent::Defer, Sent::Edit(ai::FAILURE_HINT.to_string())]
        );
    }

    #[tokio::test]
    async fn failed_placeholder_edit_becomes_follow_up_notice() {
        let d = build_dispatcher(test_config(""), Arc::new(FakeCompletion::answering("hi")));
        let fake = Arc::new(FakeInteraction::failing_edit());

        let outcome = d.dispatch(ai_invocation(fake.clone(), "hello")).await;

        assert_eq!(outcome, DispatchOutcome::Faulted);
        assert_eq!(
            fake.sent(),
            vec![Sent::Defer, Sent::FollowUp(Reply::ephemeral(FAULT_NOTICE))]
        );
    }

    #[tokio::test]
    async fn wrong_channel_is_rejected_with_ephemeral_notice() {
        let cfg = test_config(r#", "channelId": "555""#);
        let client = Arc::new(FakeCompletion::answering("hi"));
        let d = build_dispatcher(cfg, client.clone());
        let fake = Arc::new(FakeInteraction::default());
        let inv = ai_invocation(fake.clone(), "hello").in_channel(None, ChannelId(999));

        assert_eq!(d.dispatch(inv).await, DispatchOutcome::Rejected);
        assert_eq!(
            fake.sent(),
            vec![Sent::Reply(Reply::ephemeral(WRONG_CHANNEL_NOTICE))]
        );
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn allowed_channel_is_served() {
        let cfg = test_config(r#", "channelId": "555""#);
        let d = build_dispatcher(cfg, Arc::new(FakeCompletion::answering("hi")));
        let fake = Arc::new(FakeInteraction::default());
        let inv = ai_invocation(fake.clone(), "hello").in_channel(None, ChannelId(555));

        assert_eq!(d.dispatch(inv).await, DispatchOutcome::Handled);
        assert_eq!(fake.edits().len(), 1);
    }
}
