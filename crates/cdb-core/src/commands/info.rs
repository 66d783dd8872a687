use async_trait::async_trait;
use chrono::Utc;

use crate::{
    commands::{CommandDefinition, CommandHandler, Invocation},
    formatting::format_latency,
    messaging::{
        port::Interaction,
        types::{CardField, CardFooter, InfoCard, Reply, SessionStats},
    },
    Result,
};

pub const NAME: &str = "info";

const CARD_COLOR: u32 = 0x00ff88;

/// `/info`: static description plus live gateway stats. Replies immediately.
#[derive(Default)]
pub struct InfoCommand;

impl InfoCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandHandler for InfoCommand {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition {
            name: NAME.to_string(),
            description: "Bot hakkında bilgi al".to_string(),
            options: Vec::new(),
        }
    }

    async fn handle(&self, inv: &Invocation) -> Result<()> {
        let stats = inv.responder.session_stats().await;
        inv.responder.reply(Reply::card(info_card(&stats))).await
    }
}

fn info_card(stats: &SessionStats) -> InfoCard {
    InfoCard {
        title: "🤖 CortexAI Discord Bot".to_string(),
        description: "CortexAPI entegrasyonu ile güçlendirilmiş yapay zeka botu".to_string(),
        color: CARD_COLOR,
        fields: vec![
            CardField {
                name: "📋 Komutlar".to_string(),
                value: "`/ai` - AI ile sohbet et\n`/models` - Kullanılabilir modelleri göster\n`/info` - Bu bilgi mesajı".to_string(),
                inline: false,
            },
            CardField {
                name: "🔧 Özellikler".to_string(),
                value: "• Çoklu AI model desteği\n• Slash komut entegrasyonu\n• Hızlı yanıt süresi\n• Güvenli API entegrasyonu".to_string(),
                inline: false,
            },
            CardField {
                name: "📊 İstatistikler".to_string(),
                value: format!(
                    "• Sunucu sayısı: {}\n• Ping: {}",
                    stats.guild_count,
                    format_latency(stats.latency)
                ),
                inline: false,
            },
        ],
        footer: Some(CardFooter {
            text: "CortexAI ile güçlendirilmiştir".to_string(),
            icon_url: stats.avatar_url.clone(),
        }),
        timestamp: Utc::now(),
    }
}
