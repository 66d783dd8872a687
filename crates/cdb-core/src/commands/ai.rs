use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    commands::{CommandDefinition, CommandHandler, CommandOption, Invocation, OptionChoice},
    completion::CompletionClient,
    config::Config,
    formatting::ChunkedReply,
    messaging::{port::Interaction, types::Reply},
    Result,
};

pub const NAME: &str = "ai";
pub const MESSAGE_OPTION: &str = "mesaj";
pub const MODEL_OPTION: &str = "model";

/// Shown instead of the upstream error; details only go to the log.
pub const FAILURE_HINT: &str =
    "❌ AI API'ye bağlanırken hata oluştu. API anahtarınızı kontrol edin.";

/// `/ai`: relay one prompt to the completion API.
pub struct AiCommand {
    cfg: Arc<Config>,
    client: Arc<dyn CompletionClient>,
}

impl AiCommand {
    pub fn new(cfg: Arc<Config>, client: Arc<dyn CompletionClient>) -> Self {
        Self { cfg, client }
    }
}

#[async_trait]
impl CommandHandler for AiCommand {
    fn definition(&self) -> CommandDefinition {
        let choices = self
            .cfg
            .settings
            .models
            .iter()
            .map(|m| OptionChoice {
                name: self.cfg.settings.model_label(m).to_string(),
                value: m.clone(),
            })
            .collect();

        CommandDefinition {
            name: NAME.to_string(),
            description: "Yapay zeka ile sohbet et".to_string(),
            options: vec![
                CommandOption {
                    name: MESSAGE_OPTION.to_string(),
                    description: "Yapay zekaya göndermek istediğin mesaj".to_string(),
                    required: true,
                    choices: Vec::new(),
                },
                CommandOption {
                    name: MODEL_OPTION.to_string(),
                    description: format!(
                        "Kullanılacak AI modeli (varsayılan: {})",
                        self.cfg.settings.default_model
                    ),
                    required: false,
                    choices,
                },
            ],
        }
    }

    async fn handle(&self, inv: &Invocation) -> Result<()> {
        let message = inv.required_arg(MESSAGE_OPTION)?;
        let model = inv
            .arg(MODEL_OPTION)
            .unwrap_or(self.cfg.settings.default_model.as_str());

        // The acknowledgement deadline is a few seconds; completions can take far longer.
        inv.responder.defer().await?;

        let response = match self.client.chat(message, model).await {
            Ok(text) => text,
            Err(e) => {
                warn!(model, error = %e, "completion failed");
                return inv.responder.edit_reply(FAILURE_HINT).await;
            }
        };

        let out = ChunkedReply::for_model(model, &response);
        inv.responder.edit_reply(&out.first).await?;
        for chunk in out.follow_ups {
            inv.responder.follow_up(Reply::text(chunk)).await?;
        }
        if out.dropped > 0 {
            debug!(model, dropped = out.dropped, "response truncated");
        }

        Ok(())
    }
}
