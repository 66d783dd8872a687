use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    commands::{CommandDefinition, CommandHandler, Invocation},
    completion::CompletionClient,
    formatting::char_len,
    messaging::port::Interaction,
    Result,
};

pub const NAME: &str = "models";

const HEADER: &str = "🎯 **Kullanılabilir AI Modelleri:**\n\n";

/// `/models`: list the model catalog.
pub struct ModelsCommand {
    client: Arc<dyn CompletionClient>,
}

impl ModelsCommand {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommandHandler for ModelsCommand {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: NAME.to_string(),
            description: "Kullanılabilir AI modellerini göster".to_string(),
            options: Vec::new(),
        }
    }

    async fn handle(&self, inv: &Invocation) -> Result<()> {
        inv.responder.defer().await?;
        let models = self.client.list_models().await;
        let limit = inv.responder.capabilities().max_message_len;
        inv.responder
            .edit_reply(&render_model_list(&models, limit))
            .await
    }
}

/// Header plus one bullet per model. Catalogs that do not fit in `limit`
/// characters are cut at a line boundary with a count of what was left out.
fn render_model_list(models: &[String], limit: usize) -> String {
    let mut out = HEADER.to_string();
    for (i, m) in models.iter().enumerate() {
        let line = if i == 0 {
            format!("• {m}")
        } else {
            format!("\n• {m}")
        };
        let rest = models.len() - i;
        let overflow = format!("\n… (+{rest})");
        // Room for the overflow marker is only needed while more lines follow.
        let reserve = if rest > 1 { char_len(&overflow) } else { 0 };
        if char_len(&out) + char_len(&line) + reserve > limit {
            out.push_str(&overflow);
            return out;
        }
        out.push_str(&line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        messaging::types::MESSAGE_LIMIT,
        testing::{FakeCompletion, FakeInteraction, Sent},
    };
    use std::collections::HashMap;

    #[tokio::test]
    async fn lists_models_as_bullets() {
        let client = Arc::new(FakeCompletion::answering("").with_models(&["a", "b", "c"]));
        let cmd = ModelsCommand::new(client);
        let fake = Arc::new(FakeInteraction::default());
        let inv = Invocation::new(NAME, HashMap::new(), fake.clone());

        cmd.handle(&inv).await.unwrap();

        assert_eq!(
            fake.sent(),
            vec![
                Sent::Defer,
                Sent::Edit(format!("{HEADER}• a\n• b\n• c"))
            ]
        );
    }

    #[test]
    fn oversized_catalog_is_cut_with_count() {
        let models = (0..500).map(|i| format!("model-{i:03}")).collect::<Vec<_>>();
        let out = render_model_list(&models, MESSAGE_LIMIT);
        assert!(char_len(&out) <= MESSAGE_LIMIT);
        assert!(out.starts_with(HEADER));
        assert!(out.contains("• model-000"));
        assert!(out.contains("… (+"));
    }
}
