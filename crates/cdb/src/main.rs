use std::{process::ExitCode, sync::Arc};

use tracing::{error, info, warn};

use cdb_core::{commands::build_dispatcher, completion::CompletionClient, config::Config};
use cdb_cortex::CortexClient;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = cdb_core::logging::init("cdb") {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!(error = %e, "configuration could not be loaded");
            error!("copy config.example.json to config.json and fill in bot.token and api.cortexApiKey");
            return ExitCode::FAILURE;
        }
    };

    let client = match CortexClient::new(&cfg.api, &cfg.settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!(error = %e, "completion client could not be built");
            return ExitCode::FAILURE;
        }
    };

    if cfg.settings.startup_check {
        if client.test_connection().await {
            info!(base_url = %cfg.api.base_url, "cortex api reachable");
        } else {
            warn!(base_url = %cfg.api.base_url, "cortex api check failed; continuing");
        }
    }

    let dispatcher = build_dispatcher(cfg.clone(), client);
    info!(
        scope = ?cfg.command_scope(),
        default_model = %cfg.settings.default_model,
        "starting discord bot"
    );

    if let Err(e) = cdb_discord::router::run(cfg, dispatcher).await {
        error!(error = %e, "discord bot failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
